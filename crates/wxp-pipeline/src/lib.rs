//! Query façade for the weather pipeline
//!
//! Orchestrates the write path (provider fetch, normalization, storage)
//! and the read paths (retrieval, aggregation, snapshot caching) behind
//! one boundary, so presentation layers never touch the components
//! directly. All failures are typed; nothing framework-specific leaks in
//! either direction.

pub mod facade;

pub use facade::*;

use thiserror::Error;
use wxp_db::DbError;
use wxp_upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller supplied out-of-range coordinates or an empty horizon
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The provider could not be reached or answered with a failure
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered but supplied no usable sections; a
    /// valid-but-empty outcome, surfaced for explicit handling
    #[error("provider returned no usable data")]
    NoDataReturned,

    /// The persistence layer could not complete the operation
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<UpstreamError> for PipelineError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidRequest(msg) => PipelineError::InvalidRequest(msg),
            UpstreamError::Unavailable(msg) => PipelineError::UpstreamUnavailable(msg),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
