use crate::cache::{KnowledgeBase, KnowledgeCache};
use crate::chunking::{segment, SegmenterConfig};
use crate::embeddings::Embedder;
use crate::error::{IndexError, QaError};
use crate::extractor::pdf_to_text;
use crate::generation::{generate_answer, Generator};
use crate::index::VectorIndex;
use crate::models::{DocumentRecord, QaOptions};
use crate::persist::IndexStorage;
use crate::resolver::resolve_context;
use crate::sections::parse_sections;
use crate::store::DocumentStore;
use std::path::Path;
use std::sync::Arc;

/// Ties the pipeline together: documents go in through `upload_*`, answers
/// come out through `ask`. One engine instance is meant to be shared across
/// concurrent requests; the knowledge-base cache is its only mutable state.
pub struct QaEngine<S>
where
    S: DocumentStore,
{
    store: S,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    storage: IndexStorage,
    cache: KnowledgeCache,
    options: QaOptions,
}

impl<S> QaEngine<S>
where
    S: DocumentStore,
{
    pub fn new(
        store: S,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        storage: IndexStorage,
        options: QaOptions,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            storage,
            cache: KnowledgeCache::new(options.cache_capacity),
            options,
        }
    }

    /// Extracts the PDF's text and uploads it under its file name.
    pub async fn upload_pdf(&self, path: &Path) -> Result<i64, QaError> {
        let text = pdf_to_text(path)?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document.pdf");
        self.upload_text(filename, &text).await
    }

    /// Stores the document, builds and persists its index, and primes the
    /// cache. Returns the new document id.
    pub async fn upload_text(&self, filename: &str, text: &str) -> Result<i64, QaError> {
        let document_id = self.store.create(filename, text).await?;
        let knowledge_base = self.build_knowledge_base(text).await?;
        self.storage.save(document_id, &knowledge_base.index)?;
        self.cache
            .insert(document_id, Arc::new(knowledge_base))
            .await;
        Ok(document_id)
    }

    /// Answers `question` against the document. A missing document or a
    /// failed (re)build is an error; a failed generation is not — the
    /// degraded-mode excerpt is returned instead.
    pub async fn ask(&self, document_id: i64, question: &str) -> Result<String, QaError> {
        let record = self.store.get(document_id).await?;
        let knowledge_base = self
            .cache
            .get_or_build(document_id, || self.hydrate(document_id, &record))
            .await?;

        let context = resolve_context(
            question,
            &knowledge_base.sections,
            &knowledge_base.index,
            knowledge_base.embedder.as_ref(),
            self.options.top_k,
            self.options.max_context_len,
        )
        .await?;

        Ok(generate_answer(
            self.generator.as_ref(),
            &context,
            question,
            self.options.fallback_excerpt_len,
        )
        .await)
    }

    /// Cache-miss path: reuse persisted artifacts when both are present,
    /// otherwise rebuild from the stored text and persist the result.
    async fn hydrate(
        &self,
        document_id: i64,
        record: &DocumentRecord,
    ) -> Result<KnowledgeBase, IndexError> {
        if let Some(index) = self.storage.load(document_id)? {
            if index.dimensions() != self.embedder.dimensions() {
                return Err(IndexError::Corrupt(format!(
                    "persisted index dimension {} != embedder dimension {}",
                    index.dimensions(),
                    self.embedder.dimensions()
                )));
            }
            return Ok(KnowledgeBase {
                index,
                sections: parse_sections(&record.content),
                embedder: self.embedder.clone(),
            });
        }

        let knowledge_base = self.build_knowledge_base(&record.content).await?;
        self.storage.save(document_id, &knowledge_base.index)?;
        Ok(knowledge_base)
    }

    async fn build_knowledge_base(&self, text: &str) -> Result<KnowledgeBase, IndexError> {
        let chunks = segment(text, SegmenterConfig::from(self.options));
        let index = VectorIndex::build(chunks, self.embedder.as_ref()).await?;
        Ok(KnowledgeBase {
            index,
            sections: parse_sections(text),
            embedder: self.embedder.clone(),
        })
    }
}
