pub mod cache;
pub mod chunking;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod generation;
pub mod index;
pub mod models;
pub mod persist;
pub mod resolver;
pub mod sections;
pub mod store;

pub use cache::{KnowledgeBase, KnowledgeCache};
pub use chunking::{segment, SegmenterConfig};
pub use embeddings::{Embedder, HashEmbedder, HttpEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use engine::QaEngine;
pub use error::{EmbedError, GenerationError, IndexError, QaError, StoreError};
pub use extractor::{pdf_to_text, LopdfExtractor, PdfExtractor};
pub use generation::{
    build_prompt, detect_explanation_style, generate_answer, ExplanationStyle, GenerationParams,
    Generator, HttpGenerator, ResponseMode,
};
pub use index::VectorIndex;
pub use models::{DocumentRecord, QaOptions};
pub use persist::IndexStorage;
pub use resolver::{resolve_context, NO_RELEVANT_CONTENT};
pub use sections::{parse_sections, SectionMap};
pub use store::{DocumentStore, JsonDocumentStore, MemoryDocumentStore};
