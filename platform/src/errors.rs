use thiserror::Error;

/// Failures reported by a backend connection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Prepare error: {0}")]
    Prepare(String),

    #[error("Execution error: {0}")]
    Execute(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl BackendError {
    /// Backend message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            BackendError::Connect(msg)
            | BackendError::Prepare(msg)
            | BackendError::Execute(msg)
            | BackendError::Transaction(msg)
            | BackendError::Decode(msg)
            | BackendError::Unsupported(msg) => msg,
        }
    }
}

/// Failures while resolving a profile into a [`crate::Platform`]
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("No backend registered for profile '{profile}' (backend '{backend}') and no usable fallback")]
    NoBackend { profile: String, backend: String },

    #[error("Connection profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}
