//! Engine configuration
//!
//! Loaded from TOML; every field has a default so an empty file (or no file)
//! yields a working configuration that reads the models from the current
//! directory.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the model directory
pub const MODEL_DIR_ENV: &str = "REIMBURSE_MODEL_DIR";
/// Config file used when none is passed explicitly
pub const CONFIG_PATH_ENV: &str = "REIMBURSE_CONFIG";

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model artifact locations
    pub models: ModelPaths,
    /// Score cache sizing
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Model artifact locations, relative to `dir` unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    /// Base directory for relative paths
    pub dir: PathBuf,
    /// Canonical primary model
    pub primary: PathBuf,
    /// Legacy primary model, converted when the canonical file is absent
    pub primary_legacy: PathBuf,
    /// Canonical residual model
    pub residual: PathBuf,
    /// Legacy residual model
    pub residual_legacy: PathBuf,
    /// Add the residual correction when a residual model is available
    pub use_residual: bool,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            primary: PathBuf::from("full_model.json"),
            primary_legacy: PathBuf::from("full_model.txt"),
            residual: PathBuf::from("residual.json"),
            residual_legacy: PathBuf::from("residual.txt"),
            use_residual: true,
        }
    }
}

impl ModelPaths {
    /// Resolve `name` against the model directory
    pub fn resolve(&self, name: &Path) -> PathBuf {
        self.dir.join(name)
    }

    pub fn primary_path(&self) -> PathBuf {
        self.resolve(&self.primary)
    }

    pub fn primary_legacy_path(&self) -> PathBuf {
        self.resolve(&self.primary_legacy)
    }

    pub fn residual_path(&self) -> PathBuf {
        self.resolve(&self.residual)
    }

    pub fn residual_legacy_path(&self) -> PathBuf {
        self.resolve(&self.residual_legacy)
    }
}

/// Score cache sizing; 0 disables a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub primary_capacity: usize,
    pub residual_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            primary_capacity: 128,
            residual_capacity: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration for a process
    ///
    /// `explicit` wins over `REIMBURSE_CONFIG`; with neither, defaults are
    /// used. `REIMBURSE_MODEL_DIR` is applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                debug!(path = %path.display(), "loading engine config");
                Self::load(&path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(MODEL_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.models.dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("models.primary", &self.models.primary),
            ("models.primary_legacy", &self.models.primary_legacy),
            ("models.residual", &self.models.residual),
            ("models.residual_legacy", &self.models.residual_legacy),
        ];
        for (key, path) in names {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.models.primary_path(), Path::new("./full_model.json"));
        assert_eq!(config.models.residual_legacy_path(), Path::new("./residual.txt"));
        assert!(config.models.use_residual);
        assert_eq!(config.cache.primary_capacity, 128);
        assert_eq!(config.cache.residual_capacity, 1);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [models]
            dir = "/srv/models"
            use_residual = false

            [cache]
            primary_capacity = 16
            "#,
            Path::new("engine.toml"),
        )
        .unwrap();

        assert_eq!(config.models.primary_path(), Path::new("/srv/models/full_model.json"));
        assert!(!config.models.use_residual);
        assert_eq!(config.cache.primary_capacity, 16);
        assert_eq!(config.cache.residual_capacity, 1);
    }

    #[test]
    fn test_absolute_model_path_ignores_dir() {
        let mut config = EngineConfig::default();
        config.models.dir = PathBuf::from("/srv/models");
        config.models.primary = PathBuf::from("/opt/full_model.json");
        assert_eq!(config.models.primary_path(), Path::new("/opt/full_model.json"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("[cache\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = EngineConfig::from_toml_str(
            "[logging]\nlevel = \"loud\"\n",
            Path::new("engine.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_model_dir_override() {
        let mut config = EngineConfig::default();
        config.apply_overrides(|key| (key == MODEL_DIR_ENV).then(|| "/data".to_string()));
        assert_eq!(config.models.dir, PathBuf::from("/data"));

        let mut untouched = EngineConfig::default();
        untouched.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(untouched.models.dir, PathBuf::from("."));
    }
}
