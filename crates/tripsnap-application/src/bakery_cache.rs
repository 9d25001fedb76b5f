use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tripsnap_core::model::Bakery;

struct LruEntries {
    records: HashMap<i64, Bakery>,
    /// Least recently used at the front.
    order: VecDeque<i64>,
}

impl LruEntries {
    fn touch(&mut self, id: i64) {
        if let Some(position) = self.order.iter().position(|&existing| existing == id) {
            self.order.remove(position);
        }
        self.order.push_back(id);
    }

    fn forget(&mut self, id: i64) {
        if let Some(position) = self.order.iter().position(|&existing| existing == id) {
            self.order.remove(position);
        }
    }
}

/// Bounded id → bakery detail cache with least-recently-used eviction.
///
/// Entries are shallow merges of every record seen for an id, so a partial
/// record from a list view never erases fields a detail fetch already filled.
pub struct BakeryCache {
    entries: Arc<RwLock<LruEntries>>,
    capacity: usize,
}

impl BakeryCache {
    /// Creates an empty cache holding at most `capacity` bakeries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(LruEntries {
                records: HashMap::new(),
                order: VecDeque::new(),
            })),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Gets a cached bakery and marks it most recently used.
    ///
    /// # Arguments
    ///
    /// * `id` - Bakery id
    ///
    /// # Returns
    ///
    /// `Some(bakery)` if cached, `None` otherwise.
    pub async fn get(&self, id: i64) -> Option<Bakery> {
        let mut entries = self.entries.write().await;
        let bakery = entries.records.get(&id).cloned()?;
        entries.touch(id);
        Some(bakery)
    }

    /// Looks at an entry without changing its recency.
    pub async fn peek(&self, id: i64) -> Option<Bakery> {
        self.entries.read().await.records.get(&id).cloned()
    }

    /// Merges `bakery` into the entry for its id, inserting if absent.
    ///
    /// # Returns
    ///
    /// The merged record as now stored.
    pub async fn merge_insert(&self, bakery: Bakery) -> Bakery {
        let id = bakery.id;
        let mut entries = self.entries.write().await;

        let merged = match entries.records.get_mut(&id) {
            Some(existing) => {
                existing.merge(bakery);
                existing.clone()
            }
            None => {
                entries.records.insert(id, bakery.clone());
                bakery
            }
        };
        entries.touch(id);

        while entries.order.len() > self.capacity {
            if let Some(evicted) = entries.order.pop_front() {
                entries.records.remove(&evicted);
                tracing::debug!("[BakeryCache] Evicted bakery {}", evicted);
            }
        }

        merged
    }

    /// Applies `update` to a cached entry in place. Returns false if absent.
    pub async fn update<F>(&self, id: i64, update: F) -> bool
    where
        F: FnOnce(&mut Bakery),
    {
        let mut entries = self.entries.write().await;
        match entries.records.get_mut(&id) {
            Some(bakery) => {
                update(bakery);
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: i64) -> Option<Bakery> {
        let mut entries = self.entries.write().await;
        entries.forget(id);
        entries.records.remove(&id)
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.records.clear();
        entries.order.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.records.is_empty()
    }
}
