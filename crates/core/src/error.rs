use thiserror::Error;

/// Failures on the embedding capability boundary.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding backend rejected the request: {0}")]
    Backend(String),
}

/// Failures while building, persisting, or loading a vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("persisted index is inconsistent: {0}")]
    Corrupt(String),
}

/// Failures on the generation capability boundary. These never surface to
/// the caller of the ask path; the answer generator recovers with a
/// degraded-mode excerpt instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation request failed: {0}")]
    Request(String),

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Failures on the document store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(i64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Engine-level error for the upload and ask operations.
#[derive(Debug, Error)]
pub enum QaError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
