// Covergen Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid item id: {0}")]
    InvalidItemId(String),

    #[error("Output directory error: {0}")]
    OutputDir(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for CoverError {
    fn from(err: anyhow::Error) -> Self {
        CoverError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoverError>;
