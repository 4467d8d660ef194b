use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid definition pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("symbol provider error: {0}")]
    SymbolProvider(String),
}

pub type Result<T> = std::result::Result<T, Error>;
