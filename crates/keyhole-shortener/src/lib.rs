//! Mapping service implementation.
//!
//! This crate ties a [`Repository`](keyhole_core::Repository) and a
//! [`Generator`](keyhole_generator::Generator) together into the
//! credential-checked [`MappingService`], and provides the background
//! [`Sweeper`] that purges expired records.

pub mod policy;
pub mod service;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod failing_repository;
#[cfg(test)]
pub(crate) mod test_clock;

pub use policy::MappingPolicy;
pub use service::MappingService;
pub use sweeper::Sweeper;
