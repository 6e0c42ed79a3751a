use crate::Generator;
use keyhole_core::{Secret, ShortId, ALPHABET};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator using sequential counters.
///
/// Ids and secrets each come from their own counter, written in base62 and
/// left-padded with `0` (e.g. `0000`, `0001`, ... `000z`, `000A`, ...). Once a
/// counter needs more digits than requested, only the lowest `length` digits
/// are kept, so codes repeat after `62^length` draws.
///
/// Predictable secrets make this unsuitable for serving traffic. It exists
/// for tests and local debugging.
#[derive(Debug, Default)]
pub struct SeqGenerator {
    ids: AtomicU64,
    secrets: AtomicU64,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            ids: AtomicU64::new(self.ids.load(Ordering::SeqCst)),
            secrets: AtomicU64::new(self.secrets.load(Ordering::SeqCst)),
        }
    }
}

impl SeqGenerator {
    /// Creates a generator whose counters both start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator whose counters both start at `offset`.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            ids: AtomicU64::new(offset),
            secrets: AtomicU64::new(offset),
        }
    }

    fn encode(mut value: u64, length: usize) -> String {
        let base = ALPHABET.len() as u64;
        let mut digits = vec![ALPHABET[0]; length];
        for slot in digits.iter_mut().rev() {
            *slot = ALPHABET[(value % base) as usize];
            value /= base;
        }
        // ALPHABET is ASCII, so every byte is a char boundary.
        digits.into_iter().map(char::from).collect()
    }
}

impl Generator for SeqGenerator {
    fn new_id(&self, length: usize) -> ShortId {
        let count = self.ids.fetch_add(1, Ordering::SeqCst);
        ShortId::new_unchecked(Self::encode(count, length))
    }

    fn new_secret(&self, length: usize) -> Secret {
        let count = self.secrets.fetch_add(1, Ordering::SeqCst);
        Secret::new_unchecked(Self::encode(count, length))
    }
}
