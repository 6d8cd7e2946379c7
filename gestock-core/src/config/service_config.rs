//! Top-level configuration, deserialized from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::GestockError;

/// Configuration for the whole service. Every field is optional; absent
/// values fall back through the `effective_*` accessors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GestockConfig {
    pub database: DatabaseConfig,
    pub stock: StockConfig,
}

/// Database section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding `gestock.db` and the lock file. Default: ".gestock".
    pub path: Option<PathBuf>,
    /// SQLite busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: Option<u64>,
}

/// Stock policy section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StockConfig {
    /// Critical threshold applied when a produit is created without one.
    /// Default: 0.
    pub seuil_critique_default: Option<i64>,
}

impl GestockConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, GestockError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GestockError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Parse from a TOML string.
    pub fn from_toml(text: &str) -> Result<Self, GestockError> {
        toml::from_str(text).map_err(|e| GestockError::Config(e.to_string()))
    }
}

impl DatabaseConfig {
    /// Returns the effective data directory, defaulting to ".gestock".
    pub fn effective_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(".gestock"))
    }

    /// Returns the effective busy timeout, defaulting to 5000 ms.
    pub fn effective_busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms.unwrap_or(5_000)
    }
}

impl StockConfig {
    /// Returns the effective default critical threshold.
    pub fn effective_seuil_critique(&self) -> i64 {
        self.seuil_critique_default.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_empty_input() {
        let config = GestockConfig::from_toml("").unwrap();
        assert_eq!(config.database.effective_path(), PathBuf::from(".gestock"));
        assert_eq!(config.database.effective_busy_timeout_ms(), 5_000);
        assert_eq!(config.stock.effective_seuil_critique(), 0);
    }

    #[test]
    fn sections_parse() {
        let text = r#"
            [database]
            path = "/var/lib/gestock"
            busy_timeout_ms = 250

            [stock]
            seuil_critique_default = 5
        "#;
        let config = GestockConfig::from_toml(text).unwrap();
        assert_eq!(
            config.database.effective_path(),
            PathBuf::from("/var/lib/gestock")
        );
        assert_eq!(config.database.effective_busy_timeout_ms(), 250);
        assert_eq!(config.stock.effective_seuil_critique(), 5);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = GestockConfig::from_toml("database = 3").unwrap_err();
        assert!(matches!(err, GestockError::Config(_)));
    }
}
