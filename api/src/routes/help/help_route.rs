//! POST /get-help and POST /get-help-cli: one Socratic hint per call.

use std::sync::Arc;

use axum::{Json, extract::State};
use context_window::{
    ContextError, ContextWindowBuilder, ConversationInput, TokenCount, split_prior_messages,
};
use hint_protocol::{HelpRequest, HelpResponse};
use request_log::RequestId;
use tracing::{error, info, instrument, warn};

use crate::{
    core::{
        app_state::AppState,
        request_guard::{check_key, check_version},
    },
    error_handler::{AppError, AppResult},
    middleware_layer::json_extractor::LenientJson,
};

/// Editor-extension entry point; requires a recent `extVersion`.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8890/get-help \
///   -H 'content-type: application/json' \
///   -d '{"version":"v2","extVersion":5,"key":"...","email":"a@b.edu",
///        "promptLabel":"Get_help","hwId":"3","activeFunction":"my_func",
///        "code":"def my_func(): ...","messages":[]}'
/// ```
#[instrument(name = "get_help_route", skip_all)]
pub async fn get_help(
    State(state): State<Arc<AppState>>,
    LenientJson(req): LenientJson<HelpRequest>,
) -> AppResult<Json<HelpResponse>> {
    check_version(&state.config, &req.version, req.ext_version, true)?;
    check_key(&state.config, &req.key)?;
    answer(&state, req).await.map(Json)
}

/// Command-line entry point; only the protocol version is checked.
#[instrument(name = "get_help_cli_route", skip_all)]
pub async fn get_help_cli(
    State(state): State<Arc<AppState>>,
    LenientJson(req): LenientJson<HelpRequest>,
) -> AppResult<Json<HelpResponse>> {
    check_version(&state.config, &req.version, None, false)?;
    check_key(&state.config, &req.key)?;
    answer(&state, req).await.map(Json)
}

/// Resolve the question, assemble the conversation, ask the model and log
/// the exchange.
async fn answer(state: &AppState, req: HelpRequest) -> AppResult<HelpResponse> {
    info!(
        hw = %req.hw_id,
        function = %req.active_function,
        label = %req.prompt_label,
        prior_messages = req.messages.len(),
        has_query = req.student_query.is_some(),
        "help request"
    );

    let hw: u32 = req.hw_id.trim().parse().map_err(|_| {
        AppError::UnresolvableUnit(ContextError::UnknownHomework(req.hw_id.clone()))
    })?;
    let question = state
        .catalog
        .resolve(&req.hw_id, &req.active_function)
        .map_err(AppError::UnresolvableUnit)?;
    let system_prompt = state
        .prompts
        .system_prompt(&req.prompt_label, hw, question.number)
        .await
        .map_err(AppError::UnresolvableUnit)?;

    // Prior turns arrive as pre-built pairs followed by the current code.
    let (history, trailing_code) = split_prior_messages(&req.messages);
    let live_code = req.code.clone().or(trailing_code);

    let counter: &dyn TokenCount = state.tokens.as_ref();
    let built = ContextWindowBuilder::new(counter, state.config.token_budget).build(
        &ConversationInput {
            system_prompt: &system_prompt,
            reference_text: Some(&question.text),
            live_code: live_code.as_deref(),
            history: &history,
            student_query: req.student_query.as_deref(),
            code_error: req.code_error.as_deref(),
        },
    );

    let id = RequestId::issue(
        hw,
        question.number,
        &req.email,
        req.consent,
        &req.active_function,
        &question.course,
    );
    info!(
        request_id = %id,
        tokens = built.total_tokens,
        messages = built.messages.len(),
        dropped = built.dropped,
        "sending conversation"
    );

    let output = state.llm.chat(&built.messages).await.map_err(|e| {
        error!(request_id = %id, messages = built.messages.len(), "model call failed");
        AppError::Provider(e)
    })?;

    let response = HelpResponse {
        output,
        request_id: id.to_string(),
    };

    if let Err(e) = state
        .logs
        .append_exchange(&id, &req.prompt_label, &built.messages, &response.output)
        .await
    {
        warn!(error = %e, request_id = %response.request_id, "exchange log append failed");
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeModel, KEY, read_body, state};
    use axum::{http::StatusCode, response::IntoResponse};
    use hint_protocol::{API_VERSION, EXT_VERSION, Message, Role};
    use request_log::RequestId;

    fn request(code: Option<&str>, messages: Vec<Message>) -> HelpRequest {
        HelpRequest {
            email: "a@b.edu".into(),
            consent: true,
            prompt_label: "Get_help".into(),
            hw_id: "3".into(),
            active_function: "my_func".into(),
            code: code.map(str::to_string),
            messages,
            version: API_VERSION.into(),
            ext_version: Some(EXT_VERSION),
            key: KEY.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn cold_start_sends_prompt_question_and_code_once() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::replying("What does the base case return?");
        let st = state(dir.path(), model.clone());

        let doc = "def my_func(n):\n    return n";
        let Json(resp) = get_help(
            State(st.clone()),
            LenientJson(request(Some(doc), vec![Message::user(doc)])),
        )
        .await
        .unwrap();

        assert_eq!(resp.output, "What does the base case return?");
        let id = RequestId::parse(&resp.request_id).unwrap();
        assert_eq!(id.assignment_id, 3);
        assert_eq!(id.question_number, Some(2));
        assert_eq!(id.course, "61a");
        assert!(id.consented());

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        let contents: Vec<_> = calls[0].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            ["You are a tutor. Mind the base case.", "Write my_func.", doc]
        );
        assert_eq!(calls[0][0].role, Role::System);

        let logged = st.logs.find_request(&resp.request_id, "Get_help").await.unwrap();
        assert_eq!(logged.unwrap().bot_feedback, resp.output);
    }

    #[tokio::test]
    async fn warm_start_replays_history_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::replying("hint");
        let st = state(dir.path(), model.clone());

        let mut req = request(
            None,
            vec![
                Message::user("old code"),
                Message::assistant("old hint"),
                Message::user("new code"),
            ],
        );
        req.student_query = Some("why recursion?".into());
        get_help(State(st), LenientJson(req)).await.unwrap();

        let sent = &model.calls()[0];
        let roles: Vec<_> = sent.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [Role::System, Role::User, Role::Assistant, Role::User, Role::User]
        );
        assert_eq!(sent[3].content, "new code");
        assert!(sent[4].content.contains("why recursion?"));
    }

    #[tokio::test]
    async fn old_extension_is_told_to_update() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::replying("x");
        let st = state(dir.path(), model.clone());

        let mut req = request(Some("c"), vec![]);
        req.ext_version = Some(3);
        let resp = get_help(State(st.clone()), LenientJson(req.clone()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(read_body(resp).await.contains("Please update your extension"));

        // The CLI route does not look at extVersion.
        assert!(get_help_cli(State(st), LenientJson(req)).await.is_ok());
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn wrong_key_is_rejected_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::replying("x");
        let st = state(dir.path(), model.clone());

        let mut req = request(Some("c"), vec![]);
        req.key = "nope".into();
        let resp = get_help(State(st.clone()), LenientJson(req))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_body(resp).await, r#"{"output":"Invalid key."}"#);
        assert!(model.calls().is_empty());
        assert_eq!(std::fs::read_dir(&st.config.output_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn unknown_homework_is_unresolvable() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::replying("x");
        let st = state(dir.path(), model.clone());

        let mut req = request(Some("c"), vec![]);
        req.hw_id = "42".into();
        let resp = get_help(State(st), LenientJson(req)).await.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(read_body(resp).await.contains("could not be determined"));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn unmapped_function_still_gets_help_without_question() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::replying("x");
        let st = state(dir.path(), model.clone());

        let mut req = request(Some("def helper(): pass"), vec![]);
        req.active_function = "helper".into();
        let Json(resp) = get_help(State(st), LenientJson(req)).await.unwrap();
        let id = RequestId::parse(&resp.request_id).unwrap();
        assert_eq!(id.question_number, None);
        assert_eq!(id.course, "unknown");
        // Empty question text is skipped; the Q0 note does not exist.
        let sent = &model.calls()[0];
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].content, "You are a tutor. ");
    }

    #[tokio::test]
    async fn provider_failure_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        let st = state(dir.path(), FakeModel::failing());

        let resp = get_help(State(st.clone()), LenientJson(request(Some("c"), vec![])))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_body(resp).await, r#"{"output":"An error occurred."}"#);
        assert_eq!(std::fs::read_dir(&st.config.output_dir).unwrap().count(), 0);
    }
}
