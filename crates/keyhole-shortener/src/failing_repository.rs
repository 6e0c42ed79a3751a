use async_trait::async_trait;
use keyhole_core::repository::{Condition, Mutator, ReadRepository, Repository, Result};
use keyhole_core::{Record, ShortId, StorageError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A store whose backend is always down. Counts the calls it refused;
/// clones share the count.
#[derive(Clone, Default)]
pub(crate) struct FailingRepository {
    calls: Arc<AtomicUsize>,
}

impl FailingRepository {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable("disk offline".to_string()))
    }
}

#[async_trait]
impl ReadRepository for FailingRepository {
    async fn get(&self, _id: &ShortId) -> Result<Option<Record>> {
        self.fail()
    }

    async fn for_each(&self, _visit: &mut (dyn for<'r> FnMut(&'r Record) + Send)) -> Result<()> {
        self.fail()
    }

    async fn len(&self) -> Result<usize> {
        self.fail()
    }
}

#[async_trait]
impl Repository for FailingRepository {
    async fn put(&self, _record: Record) -> Result<()> {
        self.fail()
    }

    async fn insert(&self, _record: Record) -> Result<()> {
        self.fail()
    }

    async fn update(&self, _id: &ShortId, _mutate: Mutator) -> Result<Record> {
        self.fail()
    }

    async fn delete(&self, _id: &ShortId) -> Result<bool> {
        self.fail()
    }

    async fn delete_if(&self, _id: &ShortId, _condition: Condition) -> Result<bool> {
        self.fail()
    }
}
