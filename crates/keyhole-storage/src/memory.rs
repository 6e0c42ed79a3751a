use async_trait::async_trait;
use keyhole_core::repository::{
    apply_mutator, Condition, Mutator, ReadRepository, Repository, Result,
};
use keyhole_core::{Record, ShortId, StorageError};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory implementation of the Repository trait.
///
/// A single mutex guards the whole map, so operations are globally
/// serialized exactly like the durable backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: Mutex<HashMap<ShortId, Record>>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, id: &ShortId) -> Result<Option<Record>> {
        Ok(self.storage.lock().get(id).cloned())
    }

    /// The guard is held while `visit` runs, so `visit` must not call back
    /// into this repository.
    async fn for_each(&self, visit: &mut (dyn for<'r> FnMut(&'r Record) + Send)) -> Result<()> {
        let storage = self.storage.lock();
        for record in storage.values() {
            visit(record);
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.storage.lock().len())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn put(&self, record: Record) -> Result<()> {
        self.storage.lock().insert(record.id.clone(), record);
        Ok(())
    }

    async fn insert(&self, record: Record) -> Result<()> {
        let mut storage = self.storage.lock();
        if storage.contains_key(&record.id) {
            return Err(StorageError::Conflict(record.id.to_string()));
        }
        storage.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, id: &ShortId, mutate: Mutator) -> Result<Record> {
        let mut storage = self.storage.lock();
        let Some(record) = storage.get_mut(id) else {
            return Err(StorageError::NotFound(id.to_string()));
        };

        apply_mutator(record, mutate);
        Ok(record.clone())
    }

    async fn delete(&self, id: &ShortId) -> Result<bool> {
        Ok(self.storage.lock().remove(id).is_some())
    }

    async fn delete_if(&self, id: &ShortId, condition: Condition) -> Result<bool> {
        let mut storage = self.storage.lock();
        let matches = storage.get(id).is_some_and(|record| condition(record));
        if matches {
            storage.remove(id);
        }
        Ok(matches)
    }
}
