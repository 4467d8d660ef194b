use crate::config::llm_provider::LlmProvider;

/// Configuration for one chat model.
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-4".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     api_version: None,
///     max_tokens: None,
///     temperature: Some(0.0),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert!(cfg.api_key.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,

    /// Model identifier; for Azure this is the deployment name.
    pub model: String,

    /// Base URL of the provider (no path).
    pub endpoint: String,

    pub api_key: Option<String>,

    /// `api-version` query value, Azure only.
    pub api_version: Option<String>,

    pub max_tokens: Option<u32>,

    pub temperature: Option<f32>,

    pub top_p: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}
