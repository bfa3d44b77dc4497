use crate::error::InvalidConfig;
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;

/// Identifier keywords checked against column names (case-insensitive
/// substring match) before any type inspection.
pub const DEFAULT_IDENTIFIER_KEYWORDS: &[&str] = &[
    "name", "email", "phone", "address", "ssn", "dob", "rollno", "mobile", "id", "user_id",
    "student_id",
];

const DEFAULT_EPSILON: f64 = 1.0;

/// Knobs for the anonymization pipeline. Lower epsilon means more noise and
/// stronger privacy; the seed exists for reproducible runs.
#[derive(Debug, Clone, Deserialize)]
pub struct PrivacyConfig {
    pub epsilon: f64,
    pub identifier_keywords: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            identifier_keywords: DEFAULT_IDENTIFIER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            seed: None,
        }
    }
}

impl PrivacyConfig {
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            epsilon,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.epsilon > 0.0 {
            Ok(())
        } else {
            Err(InvalidConfig {
                epsilon: self.epsilon,
            })
        }
    }

    /// Generator for one pipeline run. Only the outermost entry points call
    /// this; the transformations themselves take the generator as an argument.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_epsilon_is_valid() {
        assert!(PrivacyConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_and_negative_epsilon_are_rejected() {
        assert!(PrivacyConfig::with_epsilon(0.0).validate().is_err());
        assert!(PrivacyConfig::with_epsilon(-1.5).validate().is_err());
    }

    #[test]
    fn seeded_generators_agree() {
        use rand::Rng;

        let config = PrivacyConfig {
            seed: Some(42),
            ..PrivacyConfig::default()
        };

        let a: f64 = config.rng().gen();
        let b: f64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
