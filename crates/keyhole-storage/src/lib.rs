//! Repository backends for Keyhole records.
//!
//! Every backend serializes all of its operations through one
//! mutual-exclusion guard, so at most one operation touches a repository at
//! any instant and no reader ever sees a partially written record.

pub mod memory;
pub mod redb;

pub use keyhole_core::repository::{ReadRepository, Repository, Result};
pub use keyhole_core::StorageError;
pub use memory::InMemoryRepository;
pub use self::redb::RedbRepository;
