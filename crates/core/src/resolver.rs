use crate::embeddings::Embedder;
use crate::error::IndexError;
use crate::index::VectorIndex;
use crate::sections::SectionMap;

/// Returned instead of an empty context when vector search finds nothing.
/// Callers must treat it as a valid context, not an error.
pub const NO_RELEVANT_CONTENT: &str = "No relevant content found in the document.";

/// Resolves a question to a bounded context string. A heading that appears
/// verbatim inside the lowercased question short-circuits to that section's
/// body (first match in heading order wins, vector search untouched);
/// otherwise the question is embedded and the `top_k` nearest chunks are
/// joined with blank lines and truncated to `max_context_len` characters.
pub async fn resolve_context(
    question: &str,
    sections: &SectionMap,
    index: &VectorIndex,
    embedder: &dyn Embedder,
    top_k: usize,
    max_context_len: usize,
) -> Result<String, IndexError> {
    let question_lower = question.to_lowercase();
    for (heading, body) in sections.iter() {
        if question_lower.contains(heading) {
            return Ok(body.to_string());
        }
    }

    if index.is_empty() {
        return Ok(NO_RELEVANT_CONTENT.to_string());
    }

    let query_vector = embedder.embed_one(question).await?;
    let hits = index.query(&query_vector, top_k);

    let retrieved: Vec<&str> = hits
        .iter()
        .filter_map(|(position, _)| index.chunks().get(*position))
        .map(String::as_str)
        .collect();

    if retrieved.is_empty() {
        return Ok(NO_RELEVANT_CONTENT.to_string());
    }

    Ok(truncate_chars(&retrieved.join("\n\n"), max_context_len))
}

/// Truncates to at most `max_chars` characters, never splitting a multibyte
/// character.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_offset, _)) => text[..byte_offset].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;
    use crate::error::EmbedError;
    use crate::sections::parse_sections;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        inner: HashEmbedder,
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new(dimensions: usize) -> Self {
            Self {
                inner: HashEmbedder { dimensions },
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn dimensions(&self) -> usize {
            self.inner.dimensions
        }

        async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed_many(texts).await
        }

        async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed_one(text).await
        }
    }

    async fn sample_index(embedder: &dyn Embedder) -> VectorIndex {
        VectorIndex::build(
            vec![
                "Education:\nBS in CS.".to_string(),
                "Skills:\nPython, Go.".to_string(),
            ],
            embedder,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn heading_match_bypasses_vector_search() {
        let sections = parse_sections("Education:\nBS in CS.\nSkills:\nPython, Go.");
        let build_embedder = HashEmbedder { dimensions: 32 };
        let index = sample_index(&build_embedder).await;

        let query_embedder = CountingEmbedder::new(32);
        let context = resolve_context(
            "Tell me about Education:",
            &sections,
            &index,
            &query_embedder,
            3,
            1_500,
        )
        .await
        .unwrap();

        assert_eq!(context, "BS in CS.");
        assert_eq!(query_embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_matching_heading_wins() {
        let sections = parse_sections("Skills:\nPython, Go.\nOther Skills:\nCooking.");
        let embedder = HashEmbedder { dimensions: 32 };
        let index = sample_index(&embedder).await;

        let context = resolve_context("what skills are listed", &sections, &index, &embedder, 3, 1_500)
            .await
            .unwrap();
        assert_eq!(context, "Python, Go.");
    }

    #[tokio::test]
    async fn empty_index_returns_sentinel() {
        let embedder = HashEmbedder { dimensions: 32 };
        let index = VectorIndex::build(Vec::new(), &embedder).await.unwrap();

        let context = resolve_context(
            "anything at all",
            &SectionMap::new(),
            &index,
            &embedder,
            3,
            1_500,
        )
        .await
        .unwrap();
        assert_eq!(context, NO_RELEVANT_CONTENT);
    }

    #[tokio::test]
    async fn fallback_joins_nearest_chunks_within_budget() {
        let embedder = HashEmbedder { dimensions: 32 };
        let index = sample_index(&embedder).await;

        let context = resolve_context(
            "what languages does the candidate know",
            &SectionMap::new(),
            &index,
            &embedder,
            2,
            1_500,
        )
        .await
        .unwrap();

        assert!(context.contains("Python, Go."));
        assert!(context.contains("\n\n"));
    }

    #[tokio::test]
    async fn context_is_truncated_to_character_budget() {
        let embedder = HashEmbedder { dimensions: 32 };
        let index = sample_index(&embedder).await;

        let context = resolve_context(
            "what languages does the candidate know",
            &SectionMap::new(),
            &index,
            &embedder,
            2,
            10,
        )
        .await
        .unwrap();
        assert_eq!(context.chars().count(), 10);
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let truncated = truncate_chars("héllo wörld", 4);
        assert_eq!(truncated, "héll");
    }
}
