use crate::secret::Secret;
use crate::short_id::ShortId;
use crate::StorageError;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-modify-write step applied to one record by [`Repository::update`].
///
/// Only `target_url` survives the update. The repository restores the
/// other fields after the mutator returns.
pub type Mutator = Box<dyn FnOnce(&mut Record) + Send>;

/// A check evaluated against the stored record by [`Repository::delete_if`].
pub type Condition = Box<dyn for<'r> FnOnce(&'r Record) -> bool + Send>;

/// A stored URL mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Primary key, also the username of the credential pair.
    pub id: ShortId,
    /// Password of the credential pair. Never changes after creation.
    pub secret: Secret,
    /// The original URL that was shortened.
    pub target_url: String,
    /// When the record was created.
    pub created_at: Timestamp,
}

impl Record {
    /// How long the record has existed at `now`.
    pub fn age(&self, now: Timestamp) -> SignedDuration {
        now.duration_since(self.created_at)
    }

    /// Whether the record has outlived `retention` at `now`.
    ///
    /// A record exactly `retention` old is still live.
    pub fn is_expired(&self, now: Timestamp, retention: SignedDuration) -> bool {
        self.age(now) > retention
    }
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the record for a given id.
    /// Returns `None` if the id does not exist.
    async fn get(&self, id: &ShortId) -> Result<Option<Record>>;

    /// Retrieves the record whose credential username is `username`.
    ///
    /// The username of a record is its id, so this is a point lookup.
    /// A username that is not a well-formed id matches nothing.
    async fn find_by_username(&self, username: &str) -> Result<Option<Record>> {
        match ShortId::new(username) {
            Ok(id) => self.get(&id).await,
            Err(_) => Ok(None),
        }
    }

    /// Calls `visit` once for every stored record, in no particular order.
    async fn for_each(&self, visit: &mut (dyn for<'r> FnMut(&'r Record) + Send)) -> Result<()>;

    /// Number of stored records.
    async fn len(&self) -> Result<usize>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts or overwrites the record stored under `record.id`.
    async fn put(&self, record: Record) -> Result<()>;

    /// Inserts a new record. Returns `Err(Conflict)` if the id already exists.
    async fn insert(&self, record: Record) -> Result<()>;

    /// Applies `mutate` to the record stored under `id` and persists it.
    ///
    /// Returns the stored record, or `Err(NotFound)` if the id is absent.
    async fn update(&self, id: &ShortId, mutate: Mutator) -> Result<Record>;

    /// Deletes the record for a given id.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: &ShortId) -> Result<bool>;

    /// Deletes the record for `id` only if `condition` holds for the stored
    /// record. The check and the removal run under the same guard.
    ///
    /// Returns `true` if a record was removed.
    async fn delete_if(&self, id: &ShortId, condition: Condition) -> Result<bool>;
}

/// Runs `mutate` on `record`, keeping every field except `target_url`.
pub fn apply_mutator(record: &mut Record, mutate: Mutator) {
    let id = record.id.clone();
    let secret = record.secret.clone();
    let created_at = record.created_at;

    mutate(record);

    record.id = id;
    record.secret = secret;
    record.created_at = created_at;
}
