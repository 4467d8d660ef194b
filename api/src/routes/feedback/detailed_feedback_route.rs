//! /detailed-feedback: annotations submitted from the review web page.
//!
//! The page is served from another origin, so both the POST and its
//! preflight carry permissive CORS headers.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{
        StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    response::{IntoResponse, Response},
};
use hint_protocol::{DetailedFeedbackRequest, StatusBody};
use tracing::{info, instrument, warn};

use crate::{
    core::{app_state::AppState, request_guard::check_key},
    error_handler::AppResult,
    middleware_layer::json_extractor::LenientJson,
};

#[instrument(name = "detailed_feedback_route", skip_all)]
pub async fn detailed_feedback(
    State(state): State<Arc<AppState>>,
    LenientJson(req): LenientJson<DetailedFeedbackRequest>,
) -> AppResult<Response> {
    check_key(&state.config, &req.key)?;

    let path = state.logs.append_detailed_feedback(&req).await?;
    info!(path = %path.display(), "detailed feedback recorded");

    Ok((
        [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(StatusBody::ok()),
    )
        .into_response())
}

/// CORS preflight for the review page.
pub async fn detailed_feedback_preflight() -> Response {
    (
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
        Json(StatusBody::ok()),
    )
        .into_response()
}

/// Any other method on this path.
pub async fn detailed_feedback_other() -> Response {
    warn!("unsupported method on /detailed-feedback");
    (StatusCode::BAD_REQUEST, "An error occurred").into_response()
}
