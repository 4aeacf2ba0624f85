//! Error types for rendering.

use std::path::PathBuf;

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Invalid render configuration, e.g. an unknown colormap.
    #[error("Render configuration error: {0}")]
    Config(String),

    /// A bundled asset is missing or unreadable.
    #[error("Asset {path}: {message}")]
    Asset { path: PathBuf, message: String },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Grid(#[from] netcdf_parser::NetCdfError),
}

impl RenderError {
    pub fn asset(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        RenderError::Asset {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
