//! Identifier and secret generators.

pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use keyhole_core::{Secret, ShortId};

/// Trait for generating record ids and credential secrets.
///
/// Implementations are pure generators that don't interact with storage,
/// so they cannot promise uniqueness. Callers detect collisions at insert
/// time.
///
/// Generators are total for every length. A zero length yields an empty
/// token, which is not a valid id or secret, so callers validate lengths
/// before asking.
pub trait Generator: Send + Sync + 'static {
    /// Generates a record id of `length` characters from the alphabet.
    fn new_id(&self, length: usize) -> ShortId;

    /// Generates a credential secret of `length` characters from the alphabet.
    fn new_secret(&self, length: usize) -> Secret;
}
