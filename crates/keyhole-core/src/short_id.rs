use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// The 62 characters identifiers and secrets are drawn from.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const MAX_LENGTH: usize = 64;

/// The public identifier of a record.
///
/// A short id is 1-64 characters from [`ALPHABET`]. It is the primary key of
/// the record and doubles as the username of the record's credential pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    /// Creates a new `ShortId` after validating the input.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        validate_token(&id).map_err(CoreError::InvalidShortId)?;
        Ok(Self(id))
    }

    /// Creates a `ShortId` without validation.
    ///
    /// Use this only for ids produced by trusted internal sources
    /// (e.g. generators that only emit characters from [`ALPHABET`]).
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ShortId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ShortId::new(s).map_err(serde::de::Error::custom)
    }
}

/// Checks that `token` is 1-64 characters long and only uses [`ALPHABET`].
pub(crate) fn validate_token(token: &str) -> Result<(), String> {
    if token.is_empty() || token.len() > MAX_LENGTH {
        return Err(format!(
            "length must be between 1 and {}, got {}",
            MAX_LENGTH,
            token.len()
        ));
    }

    if !token.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(format!(
            "must contain only alphanumeric characters: '{}'",
            token
        ));
    }

    Ok(())
}
