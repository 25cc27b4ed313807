/// Error type for cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The counter store could not serve the operation.
    ///
    /// Callers that cannot tolerate a missing cache are expected to fall
    /// back to invoking their generator directly.
    #[error("[{store}] cache unavailable for key '{key}': {message}")]
    Unavailable {
        store: String,
        key: String,
        message: String,
    },
    /// Serialization or deserialization of an envelope failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The generator failed on the synchronous compute path.
    ///
    /// Only raised when there is no stored value to fall back to; generator
    /// failures inside background regeneration jobs are logged instead.
    #[error("generator failed for key '{key}': {message}")]
    Generator { key: String, message: String },
    /// Invalid timing configuration, rejected at setup.
    #[error("invalid cache configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Create a new unavailable error.
    pub fn unavailable(
        store: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CacheError::Unavailable {
            store: store.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new generator error.
    pub fn generator(key: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::Generator {
            key: key.into(),
            message: message.into(),
        }
    }
}
