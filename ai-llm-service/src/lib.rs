//! Chat-completion clients for the hint backend.
//!
//! - [`chat_service`]: the [`ChatModel`](chat_service::ChatModel) seam and the
//!   env-configured [`LlmChatService`](chat_service::LlmChatService)
//! - [`services`]: per-provider HTTP clients
//! - [`config`]: model config and env loading
//! - [`telemetry`]: crate-scoped tracing layer

pub mod chat_service;
pub mod error_handler;
pub mod telemetry;

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
    pub mod llm_provider;
}

pub mod services {
    pub mod ollama_service;
    pub mod open_ai_service;
}

pub use chat_service::{ChatModel, LlmChatService};
pub use error_handler::{AiLlmError, Result};
