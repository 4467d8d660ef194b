//! Backend client. Every call is raced against a fixed timeout and never
//! surfaces an error to the caller: failures come back as a displayable
//! [`HelpResponse`] or are logged and dropped.

use std::{future::Future, time::Duration};

use hint_protocol::{
    API_VERSION, DEFAULT_PROMPT_LABEL, EXT_VERSION, Feedback, FeedbackRequest, HelpRequest,
    HelpResponse, Message,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::errors::{ClientError, Result};

pub const DEFAULT_SERVER: &str = "http://localhost:8890";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which help route to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpRoute {
    /// `/get-help`, checked against the extension version.
    #[default]
    Extension,
    /// `/get-help-cli`, protocol version only.
    Cli,
}

impl HelpRoute {
    fn path(self) -> &'static str {
        match self {
            HelpRoute::Extension => "/get-help",
            HelpRoute::Cli => "/get-help-cli",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: String,
    /// Shared secret the backend expects.
    pub key: String,
    pub route: HelpRoute,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(server: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            key: key.into(),
            route: HelpRoute::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_route(mut self, route: HelpRoute) -> Self {
        self.route = route;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Everything one help call carries besides the envelope constants.
#[derive(Debug, Clone, Default)]
pub struct HelpCall {
    pub identity: String,
    pub consent: bool,
    pub hw_id: String,
    pub active_function: String,
    /// Full document; set only when there is no history to replay.
    pub code: Option<String>,
    pub student_query: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone)]
pub struct HelpClient {
    http: reqwest::Client,
    cfg: ClientConfig,
}

impl HelpClient {
    pub fn new(cfg: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.cfg.server.trim_end_matches('/'))
    }

    /// Ask for a hint.
    ///
    /// Rejections (old version, bad key) come back from the server as
    /// `{output}` with no request id and are returned as-is. Timeouts and
    /// transport failures become `"An error occurred: <cause>"`.
    #[instrument(skip_all, fields(function = %call.active_function, hw = %call.hw_id))]
    pub async fn request_help(&self, call: &HelpCall) -> HelpResponse {
        let body = HelpRequest {
            email: call.identity.clone(),
            consent: call.consent,
            prompt_label: DEFAULT_PROMPT_LABEL.to_string(),
            hw_id: call.hw_id.clone(),
            active_function: call.active_function.clone(),
            code: call.code.clone(),
            code_error: None,
            student_query: call.student_query.clone(),
            messages: call.messages.clone(),
            version: API_VERSION.to_string(),
            ext_version: Some(EXT_VERSION),
            key: self.cfg.key.clone(),
        };

        match self.post_json::<_, HelpResponse>(self.cfg.route.path(), &body).await {
            Ok(resp) => {
                info!(
                    has_request_id = !resp.request_id.is_empty(),
                    output_len = resp.output.len(),
                    "help received"
                );
                resp
            }
            Err(e) => {
                warn!(error = %e, "help request failed");
                HelpResponse::error(e)
            }
        }
    }

    /// Send a thumbs up / down. Failures are logged only.
    #[instrument(skip_all, fields(feedback = feedback.as_wire()))]
    pub async fn submit_feedback(&self, request_id: &str, feedback: Feedback) {
        let body = FeedbackRequest {
            request_id: request_id.to_string(),
            feedback: feedback.as_wire().to_string(),
            version: API_VERSION.to_string(),
            ext_version: Some(EXT_VERSION),
            key: self.cfg.key.clone(),
        };
        match self
            .post_json::<_, serde_json::Value>("/feedback", &body)
            .await
        {
            Ok(status) => debug!(%status, "feedback accepted"),
            Err(e) => warn!(error = %e, "feedback submission failed"),
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: serde::Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        race(self.cfg.timeout, async {
            let resp = self.http.post(&url).json(body).send().await?;
            Ok(resp.json::<R>().await?)
        })
        .await
    }
}

/// Run `fut` against a timer; the loser is dropped.
pub async fn race<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(ClientError::Timeout(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn call() -> HelpCall {
        HelpCall {
            identity: "a@b.edu".into(),
            hw_id: "3".into(),
            active_function: "f".into(),
            code: Some("def f(): pass".into()),
            messages: vec![Message::user("def f(): pass")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn envelope_is_sent_and_response_returned() {
        let seen = Arc::new(Mutex::new(Value::Null));
        let sink = seen.clone();
        let app = Router::new().route(
            "/get-help-cli",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = body;
                    Json(json!({"output": "hint", "requestId": "HW3 Q1 (x) @ t from f (c)"}))
                }
            }),
        );
        let base = serve(app).await;
        let client = HelpClient::new(ClientConfig::new(&base, "k").with_route(HelpRoute::Cli));

        let resp = client.request_help(&call()).await;
        assert_eq!(resp.output, "hint");
        assert!(!resp.request_id.is_empty());

        let body = seen.lock().unwrap().clone();
        assert_eq!(body["version"], "v2");
        assert_eq!(body["extVersion"], 5);
        assert_eq!(body["key"], "k");
        assert_eq!(body["promptLabel"], "Get_help");
        assert_eq!(body["email"], "a@b.edu");
    }

    #[tokio::test]
    async fn rejection_body_is_shown_without_request_id() {
        let app = Router::new().route(
            "/get-help",
            post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"output": "Invalid key."}))) }),
        );
        let base = serve(app).await;
        let resp = HelpClient::new(ClientConfig::new(base, "bad"))
            .request_help(&call())
            .await;
        assert_eq!(resp.output, "Invalid key.");
        assert_eq!(resp.request_id, "");
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let app = Router::new().route(
            "/get-help",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(json!({"output": "late", "requestId": "x"}))
            }),
        );
        let base = serve(app).await;
        let client = HelpClient::new(
            ClientConfig::new(base, "k").with_timeout(Duration::from_millis(100)),
        );
        let resp = client.request_help(&call()).await;
        assert_eq!(resp.output, "An error occurred: Timed out after 0.1 seconds");
        assert_eq!(resp.request_id, "");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_inline_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resp = HelpClient::new(ClientConfig::new(format!("http://{addr}"), "k"))
            .request_help(&call())
            .await;
        assert!(resp.output.starts_with("An error occurred: "));
        assert_eq!(resp.request_id, "");
    }

    #[tokio::test]
    async fn race_returns_winner() {
        let out = race(Duration::from_secs(1), async { Ok(7) }).await.unwrap();
        assert_eq!(out, 7);
        let err = race(Duration::from_millis(10), std::future::pending::<Result<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }
}
