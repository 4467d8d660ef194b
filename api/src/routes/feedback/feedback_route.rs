use std::sync::Arc;

use axum::{Json, extract::State};
use hint_protocol::{FeedbackRequest, StatusBody};
use tracing::instrument;

use crate::{
    core::{
        app_state::AppState,
        request_guard::{check_key, check_version},
    },
    error_handler::AppResult,
    middleware_layer::json_extractor::LenientJson,
};

/// POST /feedback: thumbs up / down on a hint.
///
/// Appends `id,timestamp,feedback` to the per-question feedback log. A
/// request id that does not parse is logged to the error file and the
/// caller gets a plain-text 500.
#[instrument(name = "feedback_route", skip_all)]
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    LenientJson(req): LenientJson<FeedbackRequest>,
) -> AppResult<Json<StatusBody>> {
    check_version(&state.config, &req.version, req.ext_version, false)?;
    check_key(&state.config, &req.key)?;

    state
        .logs
        .append_feedback(&req.request_id, &req.feedback)
        .await?;
    Ok(Json(StatusBody::ok()))
}
