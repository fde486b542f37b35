/// Errors from document and blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A merge-update targeted a document that does not exist.
    #[error("document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    /// The backend could not be reached (transport or connectivity failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A collection name, document id or blob path is not acceptable.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Document contents could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a filesystem-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<recipebook_types::TypeError> for StoreError {
    fn from(e: recipebook_types::TypeError) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
