//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Clip index {0} out of range")]
    ClipIndexOutOfRange(usize),

    #[error("API error: {0}")]
    Api(#[from] trimix_api_client::ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
