//! Runtime configuration
//!
//! Every field has a default, so an empty YAML file (or none at all) is a
//! valid configuration. Environment variables override the file:
//!
//! | Variable | Field |
//! |---|---|
//! | `THREAT_ORACLE_CONFIG` | YAML file to load first |
//! | `THREAT_ORACLE_LOG` | `log_filter` |
//! | `THREAT_ORACLE_ID_STRATEGY` | `id_strategy` (`uuid` or `sequential`) |
//! | `THREAT_ORACLE_EXPORT_DIR` | `export_dir` |
//!
//! ```yaml
//! log_filter: threat_oracle=debug
//! id_strategy: sequential
//! graph:
//!   width: 1024
//!   height: 768
//!   node_radius: 12
//! export_dir: exports
//! ```

use std::path::{Path, PathBuf};

use oracle_graph::GraphSettings;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::IdStrategy;

pub const ENV_CONFIG: &str = "THREAT_ORACLE_CONFIG";
pub const ENV_LOG: &str = "THREAT_ORACLE_LOG";
pub const ENV_ID_STRATEGY: &str = "THREAT_ORACLE_ID_STRATEGY";
pub const ENV_EXPORT_DIR: &str = "THREAT_ORACLE_EXPORT_DIR";

pub const DEFAULT_LOG_FILTER: &str = "threat_oracle=info,oracle_graph=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    pub id_strategy: IdStrategy,
    pub graph: GraphSettings,
    /// Where exported models are written
    pub export_dir: PathBuf,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            id_strategy: IdStrategy::default(),
            graph: GraphSettings::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl OracleConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load `.env`, then the file named by `THREAT_ORACLE_CONFIG` (if any),
    /// then apply the remaining `THREAT_ORACLE_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = match std::env::var(ENV_CONFIG) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from any key lookup (the process environment in
    /// [`OracleConfig::from_env`])
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        if let Some(strategy) = lookup(ENV_ID_STRATEGY) {
            self.id_strategy = strategy.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_ID_STRATEGY.to_string(),
                value: strategy.clone(),
            })?;
        }
        if let Some(dir) = lookup(ENV_EXPORT_DIR) {
            if dir.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_EXPORT_DIR.to_string(),
                    value: dir,
                });
            }
            self.export_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = OracleConfig::default();
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
        assert_eq!(config.graph.force.width, 800.0);
        assert_eq!(config.graph.node_radius, 10.0);
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(OracleConfig::from_yaml("").unwrap(), config);
    }

    #[test]
    fn test_partial_yaml() {
        let config = OracleConfig::from_yaml(
            "id_strategy: sequential\ngraph:\n  width: 1024\n  node_radius: 12\n",
        )
        .unwrap();
        assert_eq!(config.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.graph.force.width, 1024.0);
        assert_eq!(config.graph.force.height, 600.0);
        assert_eq!(config.graph.node_radius, 12.0);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_load_file_and_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "export_dir: exports").unwrap();
        let config = OracleConfig::load(file.path()).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("exports"));

        assert!(matches!(
            OracleConfig::load("/nonexistent/oracle.yaml"),
            Err(ConfigError::Io { .. })
        ));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "graph: [1, 2").unwrap();
        assert!(matches!(
            OracleConfig::load(bad.path()),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = OracleConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_LOG, "threat_oracle=debug"),
                (ENV_ID_STRATEGY, "sequential"),
                (ENV_EXPORT_DIR, "/tmp/out"),
            ]))
            .unwrap();
        assert_eq!(config.log_filter, "threat_oracle=debug");
        assert_eq!(config.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_invalid_override_names_variable() {
        let mut config = OracleConfig::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_ID_STRATEGY, "random")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"random\" for THREAT_ORACLE_ID_STRATEGY"
        );
    }
}
