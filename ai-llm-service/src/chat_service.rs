//! Shared chat service: one configured backend behind the [`ChatModel`] seam.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Dispatches to [`OpenAiService`] (OpenAI and Azure) or [`OllamaService`].
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::chat_service::{ChatModel, LlmChatService};
//! use hint_protocol::Message;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let svc: Arc<dyn ChatModel> = Arc::new(LlmChatService::from_env()?);
//! let reply = svc.chat(&[Message::system("Be brief."), Message::user("Hi")]).await?;
//! println!("{reply}");
//! # Ok(()) }
//! ```

use async_trait::async_trait;
use hint_protocol::Message;
use tracing::info;

use crate::{
    config::{
        default_config::config_from_env, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::Result,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Anything that can answer an ordered chat conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Full assistant reply to `messages`.
    async fn chat(&self, messages: &[Message]) -> Result<String>;

    /// Model name for logs.
    fn model_name(&self) -> &str;
}

enum Backend {
    OpenAi(OpenAiService),
    Ollama(OllamaService),
}

/// Chat service for a single configured model.
pub struct LlmChatService {
    backend: Backend,
}

impl LlmChatService {
    /// Build the provider client for `cfg`.
    ///
    /// # Errors
    /// Provider validation or HTTP client construction failures.
    pub fn new(cfg: LlmModelConfig) -> Result<Self> {
        let backend = match cfg.provider {
            LlmProvider::OpenAI | LlmProvider::AzureOpenAI => {
                Backend::OpenAi(OpenAiService::new(cfg)?)
            }
            LlmProvider::Ollama => Backend::Ollama(OllamaService::new(cfg)?),
        };
        let svc = Self { backend };
        info!(
            provider = ?svc.config().provider,
            model = %svc.config().model,
            "chat service ready"
        );
        Ok(svc)
    }

    /// Build from `LLM_KIND` and the provider variables.
    pub fn from_env() -> Result<Self> {
        Self::new(config_from_env()?)
    }

    pub fn config(&self) -> &LlmModelConfig {
        match &self.backend {
            Backend::OpenAi(s) => s.config(),
            Backend::Ollama(s) => s.config(),
        }
    }
}

#[async_trait]
impl ChatModel for LlmChatService {
    async fn chat(&self, messages: &[Message]) -> Result<String> {
        match &self.backend {
            Backend::OpenAi(s) => s.chat(messages).await,
            Backend::Ollama(s) => s.chat(messages).await,
        }
    }

    fn model_name(&self) -> &str {
        &self.config().model
    }
}
