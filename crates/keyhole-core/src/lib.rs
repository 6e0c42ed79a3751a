//! Core types and traits for the Keyhole URL shortener.
//!
//! This crate provides the record model, the credential tokens, and the
//! repository and shortener contracts shared by the storage backends, the
//! mapping service and the HTTP gateway.

pub mod clock;
pub mod error;
pub mod repository;
pub mod secret;
pub mod short_id;
pub mod shortener;

pub use clock::{Clock, SystemClock};
pub use error::{CoreError, MappingError, StorageError};
pub use repository::{Condition, Mutator, ReadRepository, Record, Repository};
pub use secret::Secret;
pub use short_id::{ShortId, ALPHABET};
pub use shortener::{Created, Shortener};
