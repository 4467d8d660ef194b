//! Shared fixtures for handler tests: a scripted chat model, a word-count
//! tokenizer, and an on-disk data layout in a temp dir.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_llm_service::{AiLlmError, ChatModel};
use async_trait::async_trait;
use axum::{body::to_bytes, response::Response};
use context_window::{CourseCatalog, TokenCount};
use hint_protocol::Message;
use serde_json::json;

use crate::core::{app_config::AppConfig, app_state::AppState};

pub const KEY: &str = "test-key";

/// Chat model that records every conversation and replies from a script.
pub struct FakeModel {
    reply: Option<String>,
    pub seen: Mutex<Vec<Vec<Message>>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn chat(&self, messages: &[Message]) -> ai_llm_service::Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or(AiLlmError::Timeout(Duration::from_secs(1)))
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

/// One token per whitespace-separated word.
pub struct Words;

impl TokenCount for Words {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// State rooted at `dir` with a `Get_help` prompt, a HW3 Q2 note, build
/// files, and a catalog mapping `my_func` to HW3 Q2.
pub fn state(dir: &Path, model: Arc<FakeModel>) -> Arc<AppState> {
    let root = dir.to_string_lossy().to_string();
    let config = AppConfig::from_lookup(|k| match k {
        "FE_KEY" => Some(KEY.to_string()),
        "DATA_DIR" => Some(root.clone()),
        "BUILD_DIR" => Some(format!("{root}/build")),
        "LATEST_URL" => Some("https://example.org/download".to_string()),
        _ => None,
    })
    .unwrap();

    for d in config.data_dirs() {
        std::fs::create_dir_all(d).unwrap();
    }
    std::fs::create_dir_all(&config.build_dir).unwrap();
    std::fs::write(
        config.prompt_dir.join("Get_help.txt"),
        "You are a tutor. %NOTE%",
    )
    .unwrap();
    std::fs::write(config.notes_dir.join("HW3_Q2.txt"), "Mind the base case.").unwrap();
    std::fs::write(config.build_dir.join("index.html"), "<h1>review</h1>").unwrap();

    let catalog = CourseCatalog::new(
        serde_json::from_value(json!([
            {"hw": 3, "course": "61a", "type": "question", "number": 2, "title": "Q2", "text": "Write my_func."}
        ]))
        .unwrap(),
        serde_json::from_value(json!({"hw3": {"my_func": ["61a", 2], "loose": 2}})).unwrap(),
    );

    Arc::new(AppState::new(config, catalog, model, Arc::new(Words)))
}

pub async fn read_body(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
