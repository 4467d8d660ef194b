use std::sync::Arc;

use ai_llm_service::{ChatModel, LlmChatService};
use context_window::{CourseCatalog, PromptLibrary, TiktokenCounter, TokenCount};
use request_log::LogStore;
use tracing::info;

use crate::core::app_config::AppConfig;
use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub config: AppConfig,
    pub prompts: PromptLibrary,
    pub catalog: CourseCatalog,
    pub logs: LogStore,
    pub llm: Arc<dyn ChatModel>,
    pub tokens: Arc<dyn TokenCount>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        catalog: CourseCatalog,
        llm: Arc<dyn ChatModel>,
        tokens: Arc<dyn TokenCount>,
    ) -> Self {
        Self {
            prompts: PromptLibrary::new(&config.prompt_dir, &config.notes_dir),
            logs: LogStore::new(&config.output_dir),
            config,
            catalog,
            llm,
            tokens,
        }
    }

    /// Create data directories, load the course catalog, the tokenizer and
    /// the env-configured chat model.
    pub async fn init(config: AppConfig) -> Result<Self, AppError> {
        for dir in config.data_dirs() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::Init {
                    what: "data directory",
                    detail: format!("{}: {e}", dir.display()),
                })?;
        }

        let catalog = CourseCatalog::load(&config.course_dir, &config.term)
            .await
            .map_err(|e| AppError::Init {
                what: "course catalog",
                detail: e.to_string(),
            })?;

        let tokens = TiktokenCounter::cl100k().map_err(|e| AppError::Init {
            what: "tokenizer",
            detail: e.to_string(),
        })?;

        let llm = LlmChatService::from_env().map_err(|e| AppError::Init {
            what: "chat model",
            detail: e.to_string(),
        })?;

        info!(
            address = %config.address,
            term = %config.term,
            model = %llm.model_name(),
            token_budget = config.token_budget,
            "app state ready"
        );

        Ok(Self::new(config, catalog, Arc::new(llm), Arc::new(tokens)))
    }
}
