use jiff::SignedDuration;
use keyhole_core::MappingError;
use typed_builder::TypedBuilder;

/// Longest id or secret a record can carry.
const MAX_TOKEN_LENGTH: usize = 64;

/// Business rules applied by the [`MappingService`](crate::MappingService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct MappingPolicy {
    /// Length of generated record ids.
    #[builder(default = 8)]
    pub id_length: usize,
    /// Length of generated credential secrets.
    #[builder(default = 6)]
    pub secret_length: usize,
    /// Maximum accepted target URL length, in bytes.
    #[builder(default = 100_000)]
    pub max_url_length: usize,
    /// Maximum record age before the sweeper deletes it. `None` keeps
    /// records forever.
    #[builder(default = Some(SignedDuration::from_secs(604_800)))]
    pub retention: Option<SignedDuration>,
    /// How many fresh ids `create` tries before giving up on collisions.
    #[builder(default = 5)]
    pub max_create_attempts: u32,
}

impl Default for MappingPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MappingPolicy {
    /// Checks that the policy describes a usable service.
    pub fn validate(&self) -> Result<(), MappingError> {
        for (name, length) in [("id", self.id_length), ("secret", self.secret_length)] {
            if length == 0 || length > MAX_TOKEN_LENGTH {
                return Err(MappingError::InvalidInput(format!(
                    "{name} length must be between 1 and {MAX_TOKEN_LENGTH}, got {length}"
                )));
            }
        }

        if self.max_url_length == 0 {
            return Err(MappingError::InvalidInput(
                "max url length must be positive".to_string(),
            ));
        }

        if self.max_create_attempts == 0 {
            return Err(MappingError::InvalidInput(
                "at least one create attempt is required".to_string(),
            ));
        }

        if let Some(retention) = self.retention {
            if retention.is_negative() {
                return Err(MappingError::InvalidInput(format!(
                    "retention must not be negative, got {retention:?}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_deployment() {
        let policy = MappingPolicy::default();
        assert_eq!(policy.id_length, 8);
        assert_eq!(policy.max_url_length, 100_000);
        assert_eq!(policy.retention, Some(SignedDuration::from_secs(604_800)));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn rejects_zero_lengths() {
        let policy = MappingPolicy::builder().id_length(0).build();
        assert!(matches!(
            policy.validate(),
            Err(MappingError::InvalidInput(_))
        ));

        let policy = MappingPolicy::builder().secret_length(0).build();
        assert!(policy.validate().is_err());

        let policy = MappingPolicy::builder().max_url_length(0).build();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_oversized_tokens() {
        let policy = MappingPolicy::builder().id_length(65).build();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_negative_retention() {
        let policy = MappingPolicy::builder()
            .retention(Some(SignedDuration::from_secs(-1)))
            .build();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn retention_can_be_disabled() {
        let policy = MappingPolicy::builder().retention(None).build();
        assert!(policy.validate().is_ok());
    }
}
