use crate::error::IndexError;
use crate::index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "index.json";
const CHUNKS_FILE: &str = "chunks.txt";
const NEWLINE_TOKEN: &str = "<NEWLINE>";
const CHUNK_SEPARATOR: &str = "\n<CHUNK_SEP>\n";

#[derive(Debug, Serialize, Deserialize)]
struct IndexArtifact {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

/// Per-document on-disk home for a vector index: `{base}/doc_{id}/` holding
/// the serialized vectors (`index.json`) and the chunk sequence
/// (`chunks.txt`, newline-delimited records with internal newlines escaped).
#[derive(Debug, Clone)]
pub struct IndexStorage {
    base: PathBuf,
}

impl IndexStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn document_dir(&self, document_id: i64) -> PathBuf {
        self.base.join(format!("doc_{document_id}"))
    }

    pub fn save(&self, document_id: i64, index: &VectorIndex) -> Result<(), IndexError> {
        let dir = self.document_dir(document_id);
        fs::create_dir_all(&dir)?;

        let artifact = IndexArtifact {
            dimensions: index.dimensions(),
            vectors: index.vectors().to_vec(),
        };
        fs::write(dir.join(INDEX_FILE), serde_json::to_vec(&artifact)?)?;

        let mut encoded = String::new();
        for chunk in index.chunks() {
            encoded.push_str(&chunk.replace('\n', NEWLINE_TOKEN));
            encoded.push_str(CHUNK_SEPARATOR);
        }
        fs::write(dir.join(CHUNKS_FILE), encoded)?;

        Ok(())
    }

    /// Loads the persisted index for `document_id`. `Ok(None)` means one or
    /// both artifacts are absent and the caller should rebuild from source
    /// text; a present but inconsistent pair is an error, never a partial
    /// load.
    pub fn load(&self, document_id: i64) -> Result<Option<VectorIndex>, IndexError> {
        let dir = self.document_dir(document_id);
        let index_path = dir.join(INDEX_FILE);
        let chunks_path = dir.join(CHUNKS_FILE);

        if !index_path.is_file() || !chunks_path.is_file() {
            return Ok(None);
        }

        let artifact: IndexArtifact = serde_json::from_slice(&fs::read(&index_path)?)?;
        let chunks = decode_chunks(&chunks_path)?;

        VectorIndex::from_parts(artifact.dimensions, artifact.vectors, chunks).map(Some)
    }
}

fn decode_chunks(path: &Path) -> Result<Vec<String>, IndexError> {
    let raw = fs::read_to_string(path)?;
    let chunks = raw
        .split(CHUNK_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .map(|record| record.replace(NEWLINE_TOKEN, "\n").trim_end().to_string())
        .collect();
    Ok(chunks)
}
