use thiserror::Error;

/// Everything that can go wrong between resolving a view and writing its table.
///
/// An empty result set is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TracezError {
    #[error("unknown view: {0}")]
    UnknownView(String),

    #[error("latency bucket index out of range: {0}")]
    InvalidBucket(usize),

    #[error("fetch failed: {0}")]
    FetchFailure(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid view configuration: {0}")]
    InvalidConfig(String),

    #[error("DOM error: {0}")]
    Dom(String),
}

impl TracezError {
    /// Fetch and decode failures are recovered locally by the engine.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TracezError::FetchFailure(_) | TracezError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TracezError>;
