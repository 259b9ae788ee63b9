pub mod clock;
pub mod identity;
pub mod repository;

pub use clock::{Clock, SystemClock};
pub use identity::{Gender, Role, Student};
pub use repository::StudentRepository;

/// Error taxonomy shared by every layer of the booking engine.
///
/// `VersionConflict` is the one retryable variant: it marks a lost
/// optimistic-concurrency race on a room record and is retried by the
/// component that owns the retry budget. Everything else surfaces to the
/// caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("room was modified concurrently")]
    VersionConflict,

    #[error("capacity: {0}")]
    Capacity(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }
}
