use crate::policy::MappingPolicy;
use async_trait::async_trait;
use jiff::Timestamp;
use keyhole_core::{
    Clock, Condition, Created, MappingError, Record, Repository, Shortener, StorageError,
    SystemClock,
};
use keyhole_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - id and secret generation, retrying on id collisions
/// - target URL validation against the policy's length limit
/// - credential verification for every read, update and delete
/// - retention sweeps
///
/// The service keeps no copy of any record between calls. Every operation
/// goes through the repository, whose guard provides all the locking.
#[derive(Debug, Clone)]
pub struct MappingService<R, G, C = SystemClock> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: Arc<C>,
    policy: MappingPolicy,
}

impl<R: Repository, G: Generator> MappingService<R, G> {
    /// Creates a new `MappingService` stamping records with the wall clock.
    pub fn new(repository: R, generator: G, policy: MappingPolicy) -> Result<Self, MappingError> {
        Self::with_clock(repository, generator, policy, SystemClock)
    }
}

impl<R: Repository, G: Generator, C: Clock> MappingService<R, G, C> {
    /// Creates a new `MappingService` with a custom clock.
    pub fn with_clock(
        repository: R,
        generator: G,
        policy: MappingPolicy,
        clock: C,
    ) -> Result<Self, MappingError> {
        policy.validate()?;

        Ok(Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            clock: Arc::new(clock),
            policy,
        })
    }

    /// The policy this service enforces.
    pub fn policy(&self) -> &MappingPolicy {
        &self.policy
    }

    /// Checks emptiness and length, the rules shared by create and update.
    fn check_length(&self, url: &[u8]) -> Result<(), MappingError> {
        if url.is_empty() {
            return Err(MappingError::InvalidInput(
                "URL cannot be empty".to_string(),
            ));
        }

        if url.len() > self.policy.max_url_length {
            return Err(MappingError::TooLarge {
                len: url.len(),
                max: self.policy.max_url_length,
            });
        }

        Ok(())
    }

    /// Loads the record owned by `username` and checks `password` against it.
    async fn authorize(&self, username: &str, password: &str) -> Result<Record, MappingError> {
        let record = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(MappingError::NotFound)?;

        if !record.secret.verify(password) {
            warn!(id = %record.id, "credential mismatch");
            return Err(MappingError::Unauthorized);
        }

        Ok(record)
    }
}

#[async_trait]
impl<R: Repository, G: Generator, C: Clock> Shortener for MappingService<R, G, C> {
    async fn create(&self, long_url: &[u8]) -> Result<Created, MappingError> {
        self.check_length(long_url)?;
        let target_url = std::str::from_utf8(long_url)
            .map_err(|e| MappingError::InvalidInput(format!("URL is not valid UTF-8: {e}")))?;

        for attempt in 1..=self.policy.max_create_attempts {
            let id = self.generator.new_id(self.policy.id_length);
            let secret = self.generator.new_secret(self.policy.secret_length);

            let record = Record {
                id: id.clone(),
                secret: secret.clone(),
                target_url: target_url.to_owned(),
                created_at: self.clock.now(),
            };

            match self.repository.insert(record).await {
                Ok(()) => {
                    info!(id = %id, len = long_url.len(), "created mapping");
                    return Ok(Created { id, secret });
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(id = %id, attempt, "generated id already taken, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(MappingError::Store(StorageError::Conflict(format!(
            "no free id after {} attempts",
            self.policy.max_create_attempts
        ))))
    }

    async fn resolve(&self, username: &str, password: &str) -> Result<String, MappingError> {
        let record = self.authorize(username, password).await?;
        debug!(id = %record.id, "resolved mapping");
        Ok(record.target_url)
    }

    async fn update(
        &self,
        username: &str,
        password: &str,
        new_long_url: &str,
    ) -> Result<(), MappingError> {
        self.check_length(new_long_url.as_bytes())?;
        let record = self.authorize(username, password).await?;

        // Re-check inside the guarded mutation, so a record recreated under
        // the same id since `authorize` is never touched.
        let candidate = password.to_owned();
        let new_url = new_long_url.to_owned();
        let stored = self
            .repository
            .update(
                &record.id,
                Box::new(move |r: &mut Record| {
                    if r.secret.verify(&candidate) {
                        r.target_url = new_url;
                    }
                }),
            )
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => MappingError::NotFound,
                other => MappingError::Store(other),
            })?;

        if !stored.secret.verify(password) {
            return Err(MappingError::Unauthorized);
        }

        info!(id = %record.id, "updated mapping");
        Ok(())
    }

    async fn delete(&self, username: &str, password: &str) -> Result<(), MappingError> {
        let record = self.authorize(username, password).await?;

        if !self.repository.delete(&record.id).await? {
            return Err(MappingError::NotFound);
        }

        info!(id = %record.id, "deleted mapping");
        Ok(())
    }

    async fn sweep(&self, now: Timestamp) -> Result<usize, MappingError> {
        let Some(retention) = self.policy.retention else {
            return Ok(0);
        };

        let mut expired = Vec::new();
        self.repository
            .for_each(&mut |record: &Record| {
                if record.is_expired(now, retention) {
                    expired.push(record.id.clone());
                }
            })
            .await?;

        // The record may have been replaced since the scan, so expiry is
        // checked again under the store guard.
        let mut deleted = 0;
        for id in &expired {
            let still_expired: Condition =
                Box::new(move |r: &Record| r.is_expired(now, retention));
            if self.repository.delete_if(id, still_expired).await? {
                debug!(id = %id, "expired mapping removed");
                deleted += 1;
            }
        }

        info!(deleted, "swept expired mappings");
        Ok(deleted)
    }
}
