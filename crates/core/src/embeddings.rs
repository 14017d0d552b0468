use crate::error::EmbedError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT: usize = 384;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

/// Embedding capability. Implementations must be deterministic per model
/// version: the same text always maps to the same vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Local hashing embedder: character trigrams bucketed by FNV-1a, then
/// L2-normalized. No model download, fully deterministic.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    pub dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashEmbedder {
    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.embed_text(text))
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    vectors: Vec<Vec<f32>>,
}

/// Remote embedding model behind a JSON endpoint.
pub struct HttpEmbedder {
    endpoint: String,
    api_key: Option<String>,
    dimensions: usize,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, dimensions: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            dimensions,
            client: Client::new(),
        }
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { texts });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EmbedError::Backend(format!(
                "embedding endpoint {} returned {}",
                self.endpoint,
                response.status()
            )));
        }

        let payload: EmbedResponse = response.json().await?;
        if payload.vectors.len() != texts.len() {
            return Err(EmbedError::Backend(format!(
                "expected {} vectors, got {}",
                texts.len(),
                payload.vectors.len()
            )));
        }

        for vector in &payload.vectors {
            if vector.len() != self.dimensions {
                return Err(EmbedError::Backend(format!(
                    "embedding dimension {} != {}",
                    vector.len(),
                    self.dimensions
                )));
            }
        }

        Ok(payload.vectors)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let vectors = self.request(&[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::Backend("empty embedding response".to_string()))
    }
}
