//! Version and shared-key checks every extension route runs first.

use hint_protocol::API_VERSION;

use crate::core::app_config::AppConfig;
use crate::error_handler::{AppError, AppResult};

/// Reject clients speaking another protocol version. With `require_ext`,
/// also reject editor extensions older than the configured minimum.
pub fn check_version(
    cfg: &AppConfig,
    version: &str,
    ext_version: Option<u32>,
    require_ext: bool,
) -> AppResult<()> {
    let ext_ok = !require_ext || ext_version.is_some_and(|v| v >= cfg.min_ext_version);
    if version != API_VERSION || !ext_ok {
        return Err(AppError::VersionRejected {
            update_url: cfg.update_url.clone(),
        });
    }
    Ok(())
}

pub fn check_key(cfg: &AppConfig, key: &str) -> AppResult<()> {
    if key != cfg.fe_key {
        return Err(AppError::InvalidKey);
    }
    Ok(())
}
