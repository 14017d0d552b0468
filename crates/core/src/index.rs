use crate::embeddings::Embedder;
use crate::error::{EmbedError, IndexError};

/// Exact nearest-neighbor index over one document's chunks. Chunk `i` pairs
/// with vector `i`; the pairing is rebuilt wholesale when the source text
/// changes, never mutated incrementally. Document-scale chunk counts make a
/// brute-force L2 scan both sufficient and fully deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
    chunks: Vec<String>,
}

impl VectorIndex {
    /// Embeds every chunk and assembles the index. Any embedding failure
    /// aborts the whole build; a partial index is never produced.
    pub async fn build(chunks: Vec<String>, embedder: &dyn Embedder) -> Result<Self, IndexError> {
        let dimensions = embedder.dimensions();
        let vectors = embedder.embed_many(&chunks).await?;

        if vectors.len() != chunks.len() {
            return Err(IndexError::Embedding(EmbedError::Backend(format!(
                "embedding count {} doesn't match chunk count {}",
                vectors.len(),
                chunks.len()
            ))));
        }
        for vector in &vectors {
            if vector.len() != dimensions {
                return Err(IndexError::Embedding(EmbedError::Backend(format!(
                    "embedding dimension {} != {}",
                    vector.len(),
                    dimensions
                ))));
            }
        }

        Ok(Self {
            dimensions,
            vectors,
            chunks,
        })
    }

    /// Reassembles an index from persisted parts.
    pub(crate) fn from_parts(
        dimensions: usize,
        vectors: Vec<Vec<f32>>,
        chunks: Vec<String>,
    ) -> Result<Self, IndexError> {
        if vectors.len() != chunks.len() {
            return Err(IndexError::Corrupt(format!(
                "{} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        Ok(Self {
            dimensions,
            vectors,
            chunks,
        })
    }

    /// Returns up to `k` chunk positions by ascending L2 distance to
    /// `vector`. An empty index yields an empty result; ties keep chunk
    /// order (stable sort), so results are deterministic.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<(usize, f32)> {
        if vector.len() != self.dimensions {
            // a mismatched query vector cannot be ranked meaningfully; the
            // engine rejects mismatched indexes before queries reach here
            debug_assert_eq!(vector.len(), self.dimensions);
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, candidate)| (position, l2_distance(vector, candidate)))
            .collect();

        scored.sort_by(|left, right| left.1.total_cmp(&right.1));
        scored.truncate(k);
        scored
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub(crate) fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn l2_distance(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;

    async fn sample_index() -> VectorIndex {
        let chunks = vec![
            "hydraulic pumps move fluid under pressure".to_string(),
            "python and go are programming languages".to_string(),
            "the quick brown fox jumps over the lazy dog".to_string(),
        ];
        VectorIndex::build(chunks, &HashEmbedder { dimensions: 64 })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn query_returns_at_most_k_results_in_ascending_order() {
        let embedder = HashEmbedder { dimensions: 64 };
        let index = sample_index().await;
        let query = embedder.embed_one("programming languages").await.unwrap();

        let hits = index.query(&query, 2);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].1 <= hits[1].1);
    }

    #[tokio::test]
    async fn query_with_large_k_returns_all_vectors() {
        let embedder = HashEmbedder { dimensions: 64 };
        let index = sample_index().await;
        let query = embedder.embed_one("anything").await.unwrap();

        assert_eq!(index.query(&query, 50).len(), 3);
    }

    #[tokio::test]
    async fn empty_index_returns_empty_result() {
        let index = VectorIndex::build(Vec::new(), &HashEmbedder { dimensions: 64 })
            .await
            .unwrap();
        assert!(index.is_empty());
        assert!(index.query(&vec![0.0; 64], 3).is_empty());
    }

    #[tokio::test]
    async fn nearest_chunk_is_the_semantically_closest_one() {
        let embedder = HashEmbedder { dimensions: 64 };
        let index = sample_index().await;
        let query = embedder
            .embed_one("python and go are programming languages")
            .await
            .unwrap();

        let hits = index.query(&query, 1);
        assert_eq!(hits[0].0, 1);
    }

    #[test]
    fn mismatched_chunk_and_vector_counts_are_rejected() {
        let result = VectorIndex::from_parts(4, vec![vec![0.0; 4]], Vec::new());
        assert!(matches!(result, Err(IndexError::Corrupt(_))));
    }
}
