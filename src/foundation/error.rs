/// Convenience result type used across scrutin.
pub type ScrutinResult<T> = Result<T, ScrutinError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ScrutinError {
    /// Invalid ballot-definition data rejected at load time.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while constructing or restarting a terminal session.
    #[error("session error: {0}")]
    Session(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrutinError {
    /// Build a [`ScrutinError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrutinError::Session`] value.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }
}
