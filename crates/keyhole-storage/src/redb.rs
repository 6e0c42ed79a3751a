use async_trait::async_trait;
use keyhole_core::repository::{
    apply_mutator, Condition, Mutator, ReadRepository, Repository, Result,
};
use keyhole_core::{Record, ShortId, StorageError};
use parking_lot::Mutex;
use ::redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Table of JSON-encoded records keyed by id.
const RECORDS_TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("records");

/// Durable repository backed by a single redb file.
///
/// redb gives each committed write transaction crash-safe durability. On top
/// of that, one process-wide guard serializes every operation (reads
/// included), so a repository never runs two operations at once. Each
/// operation is one redb transaction executed on the blocking thread pool.
#[derive(Clone)]
pub struct RedbRepository {
    db: Arc<Database>,
    guard: Arc<Mutex<()>>,
}

impl std::fmt::Debug for RedbRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbRepository").finish_non_exhaustive()
    }
}

impl RedbRepository {
    /// Opens or creates the store at `path`, creating parent directories and
    /// the records table if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!(
                    "failed to create store directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let db = Database::create(path).map_err(map_redb_error)?;

        let write_txn = db.begin_write().map_err(map_redb_error)?;
        {
            let _table = write_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;
        }
        write_txn.commit().map_err(map_redb_error)?;

        debug!(path = %path.display(), "opened redb record store");

        Ok(Self {
            db: Arc::new(db),
            guard: Arc::new(Mutex::new(())),
        })
    }

    /// Runs `op` on the blocking pool while holding the store guard.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let guard = Arc::clone(&self.guard);

        tokio::task::spawn_blocking(move || {
            let _held = guard.lock();
            op(&db)
        })
        .await
        .map_err(|e| StorageError::Operation(format!("storage task failed: {e}")))?
    }

    fn read_all(db: &Database) -> Result<Vec<Record>> {
        let read_txn = db.begin_read().map_err(map_redb_error)?;
        let table = read_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;

        let mut records = Vec::new();
        for item in table.iter().map_err(map_redb_error)? {
            let (_, value) = item.map_err(map_redb_error)?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }

    /// Writes `record`, refusing to replace an existing one unless `overwrite`.
    fn write(db: &Database, record: Record, overwrite: bool) -> Result<()> {
        let bytes = encode(&record)?;
        let write_txn = db.begin_write().map_err(map_redb_error)?;
        {
            let mut table = write_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;
            let key = record.id.as_str();

            if !overwrite && table.get(key).map_err(map_redb_error)?.is_some() {
                return Err(StorageError::Conflict(record.id.to_string()));
            }

            table
                .insert(key, bytes.as_slice())
                .map_err(map_redb_error)?;
        }
        write_txn.commit().map_err(map_redb_error)?;
        Ok(())
    }
}

fn encode(record: &Record) -> Result<Vec<u8>> {
    serde_json::to_vec(record)
        .map_err(|e| StorageError::InvalidData(format!("failed to encode record: {e}")))
}

fn decode(bytes: &[u8]) -> Result<Record> {
    serde_json::from_slice(bytes)
        .map_err(|e| StorageError::InvalidData(format!("failed to decode record: {e}")))
}

fn map_redb_error(err: impl Into<::redb::Error>) -> StorageError {
    let err = err.into();
    let message = err.to_string();

    match err {
        ::redb::Error::Io(_) | ::redb::Error::DatabaseAlreadyOpen => {
            StorageError::Unavailable(message)
        }
        ::redb::Error::Corrupted(_) | ::redb::Error::ValueTooLarge(_) => {
            StorageError::InvalidData(message)
        }
        _ => StorageError::Operation(message),
    }
}

#[async_trait]
impl ReadRepository for RedbRepository {
    async fn get(&self, id: &ShortId) -> Result<Option<Record>> {
        let key = id.as_str().to_owned();

        self.run(move |db| {
            let read_txn = db.begin_read().map_err(map_redb_error)?;
            let table = read_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;

            match table.get(key.as_str()).map_err(map_redb_error)? {
                Some(value) => decode(value.value()).map(Some),
                None => Ok(None),
            }
        })
        .await
    }

    /// The records are read in one transaction under the guard, then
    /// visited after the guard is released.
    async fn for_each(&self, visit: &mut (dyn for<'r> FnMut(&'r Record) + Send)) -> Result<()> {
        let records = self.run(Self::read_all).await?;
        for record in &records {
            visit(record);
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        self.run(|db| {
            let read_txn = db.begin_read().map_err(map_redb_error)?;
            let table = read_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;

            let mut count = 0;
            for item in table.iter().map_err(map_redb_error)? {
                item.map_err(map_redb_error)?;
                count += 1;
            }
            Ok(count)
        })
        .await
    }
}

#[async_trait]
impl Repository for RedbRepository {
    async fn put(&self, record: Record) -> Result<()> {
        self.run(move |db| Self::write(db, record, true)).await
    }

    async fn insert(&self, record: Record) -> Result<()> {
        self.run(move |db| Self::write(db, record, false)).await
    }

    async fn update(&self, id: &ShortId, mutate: Mutator) -> Result<Record> {
        let key = id.as_str().to_owned();

        self.run(move |db| {
            let write_txn = db.begin_write().map_err(map_redb_error)?;
            let record = {
                let mut table = write_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;

                let existing = table
                    .get(key.as_str())
                    .map_err(map_redb_error)?
                    .map(|value| value.value().to_vec());
                let Some(existing) = existing else {
                    return Err(StorageError::NotFound(key));
                };

                let mut record = decode(&existing)?;
                apply_mutator(&mut record, mutate);

                let bytes = encode(&record)?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .map_err(map_redb_error)?;
                record
            };
            write_txn.commit().map_err(map_redb_error)?;
            Ok(record)
        })
        .await
    }

    async fn delete(&self, id: &ShortId) -> Result<bool> {
        let key = id.as_str().to_owned();

        self.run(move |db| {
            let write_txn = db.begin_write().map_err(map_redb_error)?;
            let removed = {
                let mut table = write_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;
                let removed = table
                    .remove(key.as_str())
                    .map_err(map_redb_error)?
                    .is_some();
                removed
            };
            write_txn.commit().map_err(map_redb_error)?;
            Ok(removed)
        })
        .await
    }

    async fn delete_if(&self, id: &ShortId, condition: Condition) -> Result<bool> {
        let key = id.as_str().to_owned();

        self.run(move |db| {
            let write_txn = db.begin_write().map_err(map_redb_error)?;
            let removed = {
                let mut table = write_txn.open_table(RECORDS_TABLE).map_err(map_redb_error)?;

                let existing = table
                    .get(key.as_str())
                    .map_err(map_redb_error)?
                    .map(|value| value.value().to_vec());
                let Some(existing) = existing else {
                    return Ok(false);
                };

                if !condition(&decode(&existing)?) {
                    return Ok(false);
                }

                let removed = table
                    .remove(key.as_str())
                    .map_err(map_redb_error)?
                    .is_some();
                removed
            };
            write_txn.commit().map_err(map_redb_error)?;
            Ok(removed)
        })
        .await
    }
}
