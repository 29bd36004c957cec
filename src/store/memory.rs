use {
    super::{LogStore, ScanEvent, Snapshot, StoreError},
    async_trait::async_trait,
    std::sync::atomic::{AtomicUsize, Ordering},
    tokio::sync::RwLock,
};

/// In-process scan log
///
/// Counts delete calls so callers can check that a removal never reached
/// the store.
#[derive(Default)]
pub struct MemoryLogStore {
    records: RwLock<Snapshot>,
    deletes: AtomicUsize,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events<I, K>(events: I) -> Self
    where
        I: IntoIterator<Item = (K, ScanEvent)>,
        K: Into<String>,
    {
        let records = events.into_iter().map(|(k, e)| (k.into(), e)).collect();
        Self {
            records: RwLock::new(records),
            deletes: AtomicUsize::new(0),
        }
    }

    pub async fn insert(&self, key: &str, event: ScanEvent) {
        self.records.write().await.insert(key.to_string(), event);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of `delete` calls received, including no-op ones
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn get_all(&self) -> Result<Snapshot, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.records.write().await.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
