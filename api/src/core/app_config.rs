//! Backend configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `API_ADDRESS` | `0.0.0.0:{PORT}` |
//! | `PORT` | `8890` |
//! | `DATA_DIR` | `data` |
//! | `PROMPT_DIR` | `{DATA_DIR}/prompts` |
//! | `OUTPUT_DIR` | `{DATA_DIR}/outputs` |
//! | `NOTES_DIR` | `{DATA_DIR}/notes` |
//! | `BUILD_DIR` | `build` |
//! | `COURSE_DIR` | `.` (holds `scrapes/` and `active-function-maps/`) |
//! | `COURSE_TERM` | `fa24` |
//! | `FE_KEY` | required |
//! | `UPDATE_URL` | `http://{API_ADDRESS}/latest` |
//! | `LATEST_URL` | unset: `/latest` answers 404 |
//! | `MIN_EXT_VERSION` | `4` |
//! | `TOKEN_BUDGET` | `6500` |

use std::path::PathBuf;

use context_window::DEFAULT_TOKEN_BUDGET;
use hint_protocol::MIN_EXT_VERSION;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8890;
pub const DEFAULT_TERM: &str = "fa24";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value in {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub address: String,
    pub prompt_dir: PathBuf,
    pub output_dir: PathBuf,
    pub notes_dir: PathBuf,
    pub build_dir: PathBuf,
    pub course_dir: PathBuf,
    pub term: String,
    /// Shared secret the extension and review page must send.
    pub fe_key: String,
    /// Link shown to students whose extension is too old.
    pub update_url: String,
    /// Download location `/latest` redirects to.
    pub latest_url: Option<String>,
    pub min_ext_version: u32,
    pub token_budget: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port: u16 = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
        let address = var("API_ADDRESS").unwrap_or_else(|| format!("0.0.0.0:{port}"));

        let data_dir = PathBuf::from(var("DATA_DIR").unwrap_or_else(|| "data".into()));
        let dir_or = |name: &str, sub: &str| {
            var(name)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(sub))
        };

        Ok(Self {
            prompt_dir: dir_or("PROMPT_DIR", "prompts"),
            output_dir: dir_or("OUTPUT_DIR", "outputs"),
            notes_dir: dir_or("NOTES_DIR", "notes"),
            build_dir: PathBuf::from(var("BUILD_DIR").unwrap_or_else(|| "build".into())),
            course_dir: PathBuf::from(var("COURSE_DIR").unwrap_or_else(|| ".".into())),
            term: var("COURSE_TERM").unwrap_or_else(|| DEFAULT_TERM.into()),
            fe_key: var("FE_KEY").ok_or(ConfigError::MissingVar("FE_KEY"))?,
            update_url: var("UPDATE_URL").unwrap_or_else(|| format!("http://{address}/latest")),
            latest_url: var("LATEST_URL"),
            min_ext_version: parse_or(var("MIN_EXT_VERSION"), "MIN_EXT_VERSION", MIN_EXT_VERSION)?,
            token_budget: parse_or(var("TOKEN_BUDGET"), "TOKEN_BUDGET", DEFAULT_TOKEN_BUDGET)?,
            address,
        })
    }

    /// Directories the server writes to or reads assets from.
    pub fn data_dirs(&self) -> [&PathBuf; 3] {
        [&self.prompt_dir, &self.output_dir, &self.notes_dir]
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value: v }),
        None => Ok(default),
    }
}
