use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored document: raw extracted text plus upload metadata. Content is
/// immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub filename: String,
    pub content: String,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Tunables for the question-answering pipeline.
#[derive(Debug, Clone, Copy)]
pub struct QaOptions {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between successive chunks.
    pub overlap: usize,
    /// Nearest chunks retrieved per question.
    pub top_k: usize,
    /// Character budget for assembled retrieval context.
    pub max_context_len: usize,
    /// Characters of context quoted in a degraded-mode answer.
    pub fallback_excerpt_len: usize,
    /// Knowledge bases kept in memory before LRU eviction.
    pub cache_capacity: usize,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            overlap: 200,
            top_k: 3,
            max_context_len: 1_500,
            fallback_excerpt_len: 500,
            cache_capacity: 32,
        }
    }
}
