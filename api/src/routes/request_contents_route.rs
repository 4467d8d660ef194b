//! GET /frontend-get-request-contents?requestId=<b64>&requestId=<b64>
//!
//! Lets the review page show what the student sent and what the bot
//! answered. Request ids travel base64-encoded; padding may be lost on the
//! way, so ids are decoded without it.

use std::sync::Arc;

use axum::{
    Json,
    extract::{RawQuery, State},
    http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use hint_protocol::DEFAULT_PROMPT_LABEL;
use tracing::{debug, info, instrument, warn};

use crate::{core::app_state::AppState, error_handler::AppResult};

const REQUEST_ID_PARAM: &str = "requestId";

#[instrument(name = "request_contents_route", skip_all)]
pub async fn request_contents(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> AppResult<Response> {
    let ids = decode_request_ids(query.as_deref().unwrap_or_default());
    info!(count = ids.len(), "request contents lookup");

    let mut found = Vec::with_capacity(ids.len());
    for id in &ids {
        match state.logs.find_request(id, DEFAULT_PROMPT_LABEL).await? {
            Some(contents) => found.push(contents),
            None => debug!(request_id = %id, "no logged exchange"),
        }
    }

    Ok(([(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(found)).into_response())
}

/// Every `requestId` value in `query`, percent- and base64-decoded.
/// Values that do not decode are skipped.
pub fn decode_request_ids(query: &str) -> Vec<String> {
    query
        .split('&')
        .filter_map(|pair| pair.strip_prefix(REQUEST_ID_PARAM)?.strip_prefix('='))
        .filter_map(|raw| match decode_one(raw) {
            Some(id) => Some(id),
            None => {
                warn!(value = %raw, "undecodable request id");
                None
            }
        })
        .collect()
}

fn decode_one(raw: &str) -> Option<String> {
    let unescaped = urlencoding::decode(raw).ok()?;
    let bytes = STANDARD_NO_PAD
        .decode(unescaped.trim_end_matches('='))
        .ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
