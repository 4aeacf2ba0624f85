//! Error types for archive access.

use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

/// Failures that stop a fetch. A scene that simply is not published is not
/// an error; see [`crate::FetchOutcome::NotFound`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Storage error: {0}")]
    Store(String),

    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected object key: {0}")]
    InvalidKey(String),
}
