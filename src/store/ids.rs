//! Id generation
//!
//! Ids are `<prefix>-<suffix>`. The suffix comes from a UUID v7 (default) or
//! a monotonic counter; either way the generator re-draws until the
//! candidate is not already taken in the target collection.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

/// Prefix for threat model ids
pub const MODEL_PREFIX: &str = "model";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `<prefix>-<uuid v7>`
    #[default]
    Uuid,
    /// `<prefix>-<n>` from a store-wide counter
    Sequential,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Uuid => "uuid",
            IdStrategy::Sequential => "sequential",
        }
    }
}

impl FromStr for IdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uuid" => Ok(IdStrategy::Uuid),
            "sequential" | "counter" => Ok(IdStrategy::Sequential),
            _ => Err(ConfigError::InvalidValue {
                key: "id_strategy".into(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdGenerator {
    strategy: IdStrategy,
    counter: u64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            counter: 0,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Draw a fresh id for `prefix` that `taken` rejects
    pub fn next(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate = match self.strategy {
                IdStrategy::Uuid => format!("{prefix}-{}", Uuid::now_v7()),
                IdStrategy::Sequential => {
                    self.counter += 1;
                    format!("{prefix}-{}", self.counter)
                }
            };
            if !taken(&candidate) {
                return candidate;
            }
            tracing::debug!(id = %candidate, "generated id already taken, redrawing");
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_skip_taken() {
        let mut ids = IdGenerator::new(IdStrategy::Sequential);
        assert_eq!(ids.next("ta", |_| false), "ta-1");
        assert_eq!(ids.next("ta", |id| id == "ta-2" || id == "ta-3"), "ta-4");
        assert_eq!(ids.next("df", |_| false), "df-5");
    }

    #[test]
    fn test_uuid_ids_are_prefixed_and_distinct() {
        let mut ids = IdGenerator::default();
        let a = ids.next("model", |_| false);
        let b = ids.next("model", |_| false);
        assert!(a.starts_with("model-"));
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a["model-".len()..]).is_ok());
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("UUID".parse::<IdStrategy>().unwrap(), IdStrategy::Uuid);
        assert_eq!(
            "sequential".parse::<IdStrategy>().unwrap(),
            IdStrategy::Sequential
        );
        assert!("timestamp".parse::<IdStrategy>().is_err());
    }
}
