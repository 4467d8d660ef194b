use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Backend used for chat completions.
///
/// Parsed from `LLM_KIND`:
/// - `openai` / `chatgpt`: OpenAI-compatible `/v1/chat/completions`
/// - `azure` / `azure-openai`: Azure OpenAI deployment endpoint
/// - `ollama`: local Ollama `/api/chat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    OpenAI,
    AzureOpenAI,
    Ollama,
}

impl LlmProvider {
    /// Whether requests need an API key.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, LlmProvider::Ollama)
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "azure" | "azure-openai" | "azure_openai" => Ok(LlmProvider::AzureOpenAI),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
