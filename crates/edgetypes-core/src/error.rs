use thiserror::Error;

/// Error type for runtime type generation.
#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Runtime boot error: {0}")]
    RuntimeBoot(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

/// Coarse classification of a [`TypesError`].
///
/// Callers use this to decide retry policy without matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Io,
    RuntimeBoot,
    Dispatch,
}

impl TypesError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TypesError::Config(_) => ErrorKind::Configuration,
            TypesError::Io(_) => ErrorKind::Io,
            TypesError::RuntimeBoot(_) => ErrorKind::RuntimeBoot,
            TypesError::Dispatch(_) => ErrorKind::Dispatch,
        }
    }

    /// Whether a caller could reasonably retry the operation.
    ///
    /// Only dispatch failures qualify; everything else needs a change in
    /// configuration or environment first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TypesError::Dispatch(_))
    }
}

/// Result type alias using TypesError.
pub type Result<T> = std::result::Result<T, TypesError>;
