use crate::error::CoreError;
use crate::short_id::validate_token;
use serde::{Deserialize, Deserializer, Serialize};

/// The private half of a record's credential pair.
///
/// `Debug` never prints the value, so secrets stay out of logs. There is no
/// `PartialEq`; comparisons go through [`Secret::verify`].
#[derive(Clone, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Creates a new `Secret` after validating the input.
    pub fn new(secret: impl Into<String>) -> Result<Self, CoreError> {
        let secret = secret.into();
        validate_token(&secret).map_err(CoreError::InvalidSecret)?;
        Ok(Self(secret))
    }

    /// Creates a `Secret` without validation.
    pub fn new_unchecked(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret as a string slice.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Compares `candidate` against this secret.
    ///
    /// Runs in time independent of where the first mismatching byte is.
    /// Only the length comparison short-circuits.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        if expected.len() != candidate.len() {
            return false;
        }

        let diff = expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        std::hint::black_box(diff) == 0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Secret::new(s).map_err(serde::de::Error::custom)
    }
}
