//! Chat model config loaded from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = `openai` (default), `azure` or `ollama`
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//! - `LLM_TEMPERATURE` = optional sampling temperature, default `0.0`
//! - `LLM_TIMEOUT_SECS` = optional request timeout, default 60
//!
//! OpenAI:
//! - `OPENAI_API_KEY` (required)
//! - `OPENAI_BASE_URL` (default `https://api.openai.com`)
//! - `OPENAI_MODEL` (default `gpt-4`)
//!
//! Azure OpenAI:
//! - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_DEPLOYMENT` (required)
//! - `AZURE_OPENAI_API_VERSION` (default [`DEFAULT_AZURE_API_VERSION`])
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` (required)
//! - `OLLAMA_MODEL` (required)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32},
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Fetches a required, non-empty variable from `get`.
pub fn must_var(get: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String> {
    match get(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Optional non-empty variable.
pub fn opt_var(get: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional number (`Ok(None)` if unset/empty).
pub fn opt_number<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    reason: &'static str,
) -> Result<Option<T>> {
    match opt_var(get, name) {
        Some(v) => v.parse::<T>().map(Some).map_err(|_| {
            ConfigError::InvalidNumber {
                var: name,
                reason,
            }
            .into()
        }),
        None => Ok(None),
    }
}

/// Config from the process environment.
pub fn config_from_env() -> Result<LlmModelConfig> {
    config_from(|name| std::env::var(name).ok())
}

/// Config from an arbitrary variable lookup.
pub fn config_from(get: impl Fn(&str) -> Option<String>) -> Result<LlmModelConfig> {
    let provider = match opt_var(&get, "LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let max_tokens = opt_number::<u32>(&get, "LLM_MAX_TOKENS", "expected u32")?;
    let temperature =
        opt_number::<f32>(&get, "LLM_TEMPERATURE", "expected a float")?.unwrap_or(0.0);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;
    let timeout_secs = opt_number::<u64>(&get, "LLM_TIMEOUT_SECS", "expected u64")?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let (endpoint, model, api_key, api_version) = match provider {
        LlmProvider::OpenAI => (
            opt_var(&get, "OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            opt_var(&get, "OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            Some(must_var(&get, "OPENAI_API_KEY")?),
            None,
        ),
        LlmProvider::AzureOpenAI => (
            must_var(&get, "AZURE_OPENAI_ENDPOINT")?,
            must_var(&get, "AZURE_OPENAI_DEPLOYMENT")?,
            Some(must_var(&get, "AZURE_OPENAI_API_KEY")?),
            Some(
                opt_var(&get, "AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.into()),
            ),
        ),
        LlmProvider::Ollama => (
            ollama_endpoint(&get)?,
            must_var(&get, "OLLAMA_MODEL")?,
            None,
            None,
        ),
    };
    validate_http_endpoint("endpoint", &endpoint)?;

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        api_version,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

/// `OLLAMA_URL`, else `http://localhost:{OLLAMA_PORT}`.
fn ollama_endpoint(get: &impl Fn(&str) -> Option<String>) -> Result<String> {
    if let Some(url) = opt_var(get, "OLLAMA_URL") {
        return Ok(url);
    }
    match opt_number::<u16>(get, "OLLAMA_PORT", "expected u16 (1..=65535)")? {
        Some(port) => Ok(format!("http://localhost:{port}")),
        None => Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into()),
    }
}
