use crate::embeddings::Embedder;
use crate::error::IndexError;
use crate::index::VectorIndex;
use crate::sections::SectionMap;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything cached per document: the vector index (which owns the chunk
/// sequence), the parsed section map, and the embedder handle used to build
/// the index.
pub struct KnowledgeBase {
    pub index: VectorIndex,
    pub sections: SectionMap,
    pub embedder: Arc<dyn Embedder>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<i64, Arc<KnowledgeBase>>,
    recency: VecDeque<i64>,
}

impl CacheState {
    fn touch(&mut self, document_id: i64) {
        self.recency.retain(|id| *id != document_id);
        self.recency.push_back(document_id);
    }
}

/// Bounded in-memory cache of knowledge bases, keyed by document id, with
/// least-recently-used eviction. Concurrent misses for the same key are
/// serialized through a per-key gate so each document is built at most once.
pub struct KnowledgeCache {
    capacity: usize,
    state: Mutex<CacheState>,
    gates: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl KnowledgeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Non-blocking (beyond the state lock) read; refreshes recency.
    pub async fn get(&self, document_id: i64) -> Option<Arc<KnowledgeBase>> {
        let mut state = self.state.lock().await;
        let entry = state.entries.get(&document_id).cloned();
        if entry.is_some() {
            state.touch(document_id);
        }
        entry
    }

    pub async fn insert(&self, document_id: i64, knowledge_base: Arc<KnowledgeBase>) {
        let mut state = self.state.lock().await;
        state.entries.insert(document_id, knowledge_base);
        state.touch(document_id);

        while state.entries.len() > self.capacity {
            match state.recency.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Returns the cached knowledge base for `document_id`, building it with
    /// `build` on a miss. Concurrent callers missing on the same key wait on
    /// one gate; whoever enters first builds, the rest observe the insert.
    pub async fn get_or_build<F, Fut>(
        &self,
        document_id: i64,
        build: F,
    ) -> Result<Arc<KnowledgeBase>, IndexError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<KnowledgeBase, IndexError>>,
    {
        if let Some(entry) = self.get(document_id).await {
            return Ok(entry);
        }

        let gate = {
            let mut gates = self.gates.lock().await;
            gates
                .entry(document_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = gate.lock().await;

        // another caller may have finished the build while we waited
        if let Some(entry) = self.get(document_id).await {
            return Ok(entry);
        }

        match build().await {
            Ok(knowledge_base) => {
                let knowledge_base = Arc::new(knowledge_base);
                // insert before releasing the gate: a caller arriving now
                // either hits the cache or waits on the registered gate,
                // never builds a second time
                self.insert(document_id, knowledge_base.clone()).await;
                self.gates.lock().await.remove(&document_id);
                Ok(knowledge_base)
            }
            Err(error) => {
                self.gates.lock().await.remove(&document_id);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;
    use crate::sections::parse_sections;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn sample_knowledge_base(text: &str) -> KnowledgeBase {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder { dimensions: 16 });
        let index = VectorIndex::build(vec![text.to_string()], embedder.as_ref())
            .await
            .unwrap();
        KnowledgeBase {
            index,
            sections: parse_sections(text),
            embedder,
        }
    }

    #[tokio::test]
    async fn concurrent_misses_build_only_once() {
        let cache = Arc::new(KnowledgeCache::new(8));
        let builds = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let builds = builds.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(1, || async {
                        builds.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(sample_knowledge_base("Skills:\nPython, Go.").await)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn callers_arriving_during_the_build_handoff_do_not_rebuild() {
        let cache = Arc::new(KnowledgeCache::new(8));
        let builds = Arc::new(AtomicUsize::new(0));

        // staggered arrivals land before, during, and right after the first
        // caller's build; none of them may start a second build
        let mut handles = Vec::new();
        for wave in 0..8u64 {
            let cache = cache.clone();
            let builds = builds.clone();
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(wave * 5)).await;
                cache
                    .get_or_build(7, || async {
                        builds.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(15)).await;
                        Ok(sample_knowledge_base("Skills:\nPython, Go.").await)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let cache = KnowledgeCache::new(2);
        for id in 1..=2 {
            cache
                .insert(id, Arc::new(sample_knowledge_base("A:\nbody.").await))
                .await;
        }

        // touch 1 so that 2 becomes the eviction candidate
        assert!(cache.get(1).await.is_some());
        cache
            .insert(3, Arc::new(sample_knowledge_base("B:\nbody.").await))
            .await;

        assert!(cache.get(1).await.is_some());
        assert!(cache.get(2).await.is_none());
        assert!(cache.get(3).await.is_some());
    }

    #[tokio::test]
    async fn failed_build_is_not_cached() {
        let cache = KnowledgeCache::new(4);
        let result = cache
            .get_or_build(5, || async {
                Err(IndexError::Extraction("unreadable".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(cache.get(5).await.is_none());
    }
}
