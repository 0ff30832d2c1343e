//! This module provides functionality for loading and handling the application's configuration.
//!
//! It defines the `ProbeConfig` struct, which holds the configuration parameters,
//! a `load_config` function to load it from a YAML file, and the environment
//! overlay that supplies the API credential.
//!
//! Resolution order for every setting is: command-line flag, environment,
//! config file, built-in default. The environment is seeded from a `.env`
//! file (see [`load_dotenv`]) before anything else is read.
//!
//! # Examples
//!
//! Loading the configuration from a file:
//!
//! ```no_run
//! use policy_probe::config::{ProbeConfig, load_config};
//!
//! let config_file_path = "/path/to/config.yaml";
//! let config: ProbeConfig = load_config(config_file_path).unwrap();
//! println!("{:?}", config);
//! ```

use serde::{Deserialize, Serialize};
use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use tracing::*;

use crate::api::DEFAULT_EMBEDDING_MODEL;

/// Environment variable holding the embedding API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "OPENAI_BASE_URL";

/// Collection the build step writes by default.
pub const DEFAULT_COLLECTION: &str = "youth_policies";

/// Represents the application's configuration.
///
/// Every field has a default, so an empty YAML document (or no file at all) is a
/// valid configuration.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct ProbeConfig {
    /// The base URL of the embedding API.
    pub api_base: String,

    /// The API key. Usually left empty in favour of `OPENAI_API_KEY`.
    pub api_key: Option<String>,

    /// The embedding model used for queries.
    pub embedding_model: String,

    /// Store directory. `None` means `<project root>/data/vectordb`.
    pub db_path: Option<PathBuf>,

    /// Name of the collection inside the store.
    pub collection_name: String,

    // Result count for demonstration and interactive queries.
    pub top_k: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            db_path: None,
            collection_name: DEFAULT_COLLECTION.to_string(),
            top_k: 3,
        }
    }
}

impl ProbeConfig {
    /// Apply `OPENAI_API_KEY` / `OPENAI_BASE_URL` when they are set and non-empty.
    pub fn apply_env(&mut self) {
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            debug!("Using API key from {}", API_KEY_ENV);
            self.api_key = Some(key);
        }
        if let Some(base) = non_empty_env(API_BASE_ENV) {
            debug!("Using API base from {}: {}", API_BASE_ENV, base);
            self.api_base = base;
        }
    }

    /// The API key, or an error explaining where to put one.
    pub fn require_api_key(&self) -> Result<&str, Box<dyn Error>> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                format!("{API_KEY_ENV} is not set; add it to .env or set api_key in config.yaml")
                    .into()
            })
    }

    /// Store directory, falling back to [`crate::default_db_path`].
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(crate::default_db_path)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load `.env` from the working directory or one of its ancestors.
///
/// A missing file is not an error; variables already in the environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env: {}", e),
    }
}

/// Loads the application's configuration from a YAML file.
///
/// This function reads the file at the given path, parses it as YAML, and
/// constructs a `ProbeConfig` struct from it. Missing fields take their defaults.
///
/// # Parameters
///
/// - `file`: The path to the YAML configuration file.
///
/// # Returns
///
/// - `Ok(ProbeConfig)`: The loaded configuration.
/// - `Err(Box<dyn Error>)`: An error occurred while reading the file or parsing the YAML.
pub fn load_config(file: &str) -> Result<ProbeConfig, Box<dyn Error>> {
    debug!("Loading config: {:?}", file);
    let content = fs::read_to_string(file)?;
    let config: ProbeConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields [`ProbeConfig::default`].
pub fn load_config_or_default(path: &Path) -> Result<ProbeConfig, Box<dyn Error>> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(ProbeConfig::default());
    }
    let path = path
        .to_str()
        .ok_or_else(|| format!("non UTF-8 config path: {}", path.display()))?;
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
api_base: "http://example.com/v1"
api_key: "example_api_key"
embedding_model: "example_model"
db_path: "/srv/vectordb"
collection_name: "policies"
top_k: 5
"#
        )
        .unwrap();

        let config = load_config(temp_file.path().to_str().unwrap());

        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.api_base, "http://example.com/v1");
        assert_eq!(config.api_key.as_deref(), Some("example_api_key"));
        assert_eq!(config.embedding_model, "example_model");
        assert_eq!(config.db_path, Some(PathBuf::from("/srv/vectordb")));
        assert_eq!(config.collection_name, "policies");
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn test_load_config_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"collection_name: "other""#).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.collection_name, "other");
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_load_config_invalid_file() {
        let config = load_config("non/existent/path");
        assert!(config.is_err());
    }

    #[test]
    fn test_load_config_invalid_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"invalid: config: format"#).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap());
        assert!(config.is_err());
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn test_require_api_key() {
        let mut config = ProbeConfig::default();
        assert!(config.require_api_key().is_err());
        config.api_key = Some("   ".into());
        assert!(config.require_api_key().is_err());
        config.api_key = Some("sk-test".into());
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_resolved_db_path() {
        let mut config = ProbeConfig::default();
        assert!(config.resolved_db_path().ends_with("data/vectordb"));
        config.db_path = Some(PathBuf::from("/tmp/store"));
        assert_eq!(config.resolved_db_path(), PathBuf::from("/tmp/store"));
    }
}
