use crate::Generator;
use keyhole_core::{Secret, ShortId, ALPHABET};
use rand::rngs::OsRng;
use rand::Rng;

/// Draws every character uniformly from [`ALPHABET`] using the operating
/// system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }

    fn random_token(length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl Generator for RandomGenerator {
    fn new_id(&self, length: usize) -> ShortId {
        ShortId::new_unchecked(Self::random_token(length))
    }

    fn new_secret(&self, length: usize) -> Secret {
        Secret::new_unchecked(Self::random_token(length))
    }
}
