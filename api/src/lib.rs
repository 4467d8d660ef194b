//! HTTP surface of the hint bot.
//!
//! | Route | Method | Purpose |
//! |---|---|---|
//! | `/get-help` | POST | hint for the editor extension |
//! | `/get-help-cli` | POST | hint for the command-line client |
//! | `/feedback` | POST | thumbs up / down on a hint |
//! | `/detailed-feedback` | POST, OPTIONS | annotations from the review page |
//! | `/frontend-get-request-contents` | GET | logged exchanges for the review page |
//! | `/latest` | GET | redirect to the extension download |
//! | anything else | GET | files from the build directory |

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

mod core {
    pub mod app_config;
    pub mod app_state;
    pub mod request_guard;
}
pub mod error_handler;
mod middleware_layer {
    pub mod json_extractor;
}
mod routes;
#[cfg(test)]
mod test_support;

pub use crate::core::{app_config::AppConfig, app_state::AppState};
pub use error_handler::AppError;

use crate::routes::{
    feedback::{
        detailed_feedback_route::{
            detailed_feedback, detailed_feedback_other, detailed_feedback_preflight,
        },
        feedback_route::feedback,
    },
    help::help_route::{get_help, get_help_cli},
    request_contents_route::request_contents,
    static_files_route::{latest, static_files},
};

/// All routes over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get-help", post(get_help))
        .route("/get-help-cli", post(get_help_cli))
        .route("/feedback", post(feedback))
        .route(
            "/detailed-feedback",
            post(detailed_feedback)
                .options(detailed_feedback_preflight)
                .fallback(detailed_feedback_other),
        )
        .route("/frontend-get-request-contents", get(request_contents))
        .route("/latest", get(latest))
        .fallback(static_files)
        .with_state(state)
}

/// Load configuration from the environment, build state and serve until
/// Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let address = config.address.clone();
    let state = Arc::new(AppState::init(config).await?);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "hint bot listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeModel, KEY, state};
    use hint_protocol::{API_VERSION, HelpResponse};
    use serde_json::json;

    async fn serve(state: Arc<AppState>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn routes_are_wired() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve(state(dir.path(), FakeModel::replying("Think smaller."))).await;
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        let resp: HelpResponse = http
            .post(format!("{base}/get-help-cli"))
            .json(&json!({
                "version": API_VERSION, "key": KEY, "email": "a@b.edu",
                "promptLabel": "Get_help", "hwId": "3", "activeFunction": "my_func",
                "code": "def my_func(): pass", "messages": []
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp.output, "Think smaller.");
        assert!(resp.request_id.starts_with("HW3 Q2 (a@b.edu) @ "));

        // Unparseable bodies reach the handler and fail the version check.
        let resp = http
            .post(format!("{base}/feedback"))
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let resp = http
            .request(reqwest::Method::OPTIONS, format!("{base}/detailed-feedback"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let resp = http
            .get(format!("{base}/detailed-feedback"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let resp = http.get(format!("{base}/latest")).send().await.unwrap();
        assert_eq!(resp.status(), 302);

        let resp = http.get(format!("{base}/")).send().await.unwrap();
        assert_eq!(resp.text().await.unwrap(), "<h1>review</h1>");
        let resp = http.get(format!("{base}/missing")).send().await.unwrap();
        assert_eq!(resp.status(), 404);
    }
}
