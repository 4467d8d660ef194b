//! `/latest` redirect and the review page bundle served from the build dir.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

/// GET /latest: 302 to the current extension download.
pub async fn latest(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let url = state.config.latest_url.as_deref().ok_or(AppError::NotFound)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response())
}

/// Fallback for every other path: a file under the build directory, or
/// `404 File not found`.
pub async fn static_files(State(state): State<Arc<AppState>>, uri: Uri) -> AppResult<Response> {
    let rel = sanitize_request_path(uri.path());
    let path = state.config.build_dir.join(&rel);

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type_for(&rel))], bytes).into_response()),
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                debug!(path = %path.display(), "static file not found");
            } else {
                error!(path = %path.display(), error = %e, "static file read failed");
            }
            Err(AppError::NotFound)
        }
    }
}

/// Relative path under the build dir. Empty, `.` and `..` segments are
/// dropped so the result never leaves the directory; `/` is `index.html`.
pub fn sanitize_request_path(path: &str) -> PathBuf {
    let rel: PathBuf = path
        .split(['/', '\\'])
        .filter(|seg| !matches!(*seg, "" | "." | ".."))
        .collect();
    if rel.as_os_str().is_empty() {
        PathBuf::from("index.html")
    } else {
        rel
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
