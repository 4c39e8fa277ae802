//! Error taxonomy for the diff pipeline.
//!
//! Only hard failures live here. Geometry that falls outside a page is not an
//! error: those boxes are dropped and counted in the report. "No differences"
//! is a successful [`DiffOutcome`](crate::pipeline::DiffOutcome), not an error.

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum DiffError {
    /// Document bytes could not be parsed by the layout extractor.
    #[error("Input error: {0}")]
    Input(String),

    /// The rendering collaborator failed to draw or save.
    #[error("Render error: {0}")]
    Render(String),

    /// A collaborator library (pdfium) could not be bound.
    #[error("Backend unavailable: {0}")]
    Backend(String),

    /// A blocking worker task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiffError>;

impl From<tokio::task::JoinError> for DiffError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
