//! Error taxonomy for bucket operations.

/// Failure talking to the object store.
#[derive(thiserror::Error, Debug)]
pub enum BucketError {
    /// The backend rejected or failed an operation. Never means "absent".
    #[error("storage error during {op} of `{key}`: {message}")]
    Storage {
        op: &'static str,
        key: String,
        message: String,
    },

    /// A prefix listing produced no usable keys.
    #[error("no objects found under prefix `{prefix}`")]
    NotFound { prefix: String },

    /// Local file I/O around an upload or download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BucketError {
    pub fn storage(op: &'static str, key: impl Into<String>, message: impl ToString) -> Self {
        BucketError::Storage {
            op,
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for bucket operations.
pub type BucketResult<T> = Result<T, BucketError>;
