use thiserror::Error;

pub const FETCH_FAILURE_MESSAGE: &str = "Failed to fetch jobs. Please try again.";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CoreErrorKind {
    InvalidInput,
    Transport,
    HttpStatus,
    ParseFailure,
    Timeout,
    StorageFailure,
    Internal,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct CoreError {
    pub kind: CoreErrorKind,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Fetch failures of every flavor collapse into one user-facing message.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self.kind,
            CoreErrorKind::Transport
                | CoreErrorKind::HttpStatus
                | CoreErrorKind::ParseFailure
                | CoreErrorKind::Timeout
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
