//! # Policy Probe (library root)
//!
//! This crate provides the plumbing behind the **policy-probe** CLI, a smoke test
//! for a persisted youth-policy vector collection:
//! - Embedding API client (`api`).
//! - Read-only collection access over a HNSW index (`vector_store`, `models`).
//! - Statistics and search reporting (`search`, `pretty`).
//! - The interactive search loop (`interactive`) and the scripted run (`probe`).
//! - CLI parsing & configuration (`commands`, `config`).
//!
//! In addition, this module exposes utilities for:
//! - Discovering the per-platform configuration directory ([`config_dir`]).
//! - Locating the default store directory ([`default_db_path`]).
//!
//! ## Store discovery
//! The build step writes the collection under `data/vectordb` in the project
//! root. The project root is the directory holding this crate's `Cargo.toml`,
//! fixed at compile time, so the binary finds the store regardless of the
//! working directory it is started from. `--db-path` or `db_path` in
//! `config.yaml` point elsewhere.
//!
//! ## Modules
//! - [`api`], [`commands`], [`config`], [`interactive`], [`models`], [`pretty`],
//!   [`probe`], [`search`], [`vector_store`]

use directories::ProjectDirs;
use std::error::Error;
use std::path::PathBuf;

pub mod api;
pub mod commands;
pub mod config;
pub mod interactive;
pub mod models;
pub mod pretty;
pub mod probe;
pub mod search;
pub mod vector_store;

/// Return the per-platform configuration directory used by policy-probe.
///
/// This uses [`directories::ProjectDirs`] with the application triple
/// `("com", "policy-probe", "policy-probe")`, so you get the right place on each OS
/// (e.g., `~/.config/policy-probe` on Linux).
///
/// The directory is **not** created by this function; callers that need it should
/// create it with `fs::create_dir_all`.
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be determined
/// (which is rare but possible in heavily sandboxed environments).
///
/// # Examples
/// ```rust
/// let cfg = policy_probe::config_dir().expect("has a config dir");
/// println!("config at {}", cfg.display());
/// ```
pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
    let proj_dirs = ProjectDirs::from("com", "policy-probe", "policy-probe")
        .ok_or("Unable to determine config directory")?;
    let config_dir = proj_dirs.config_dir().to_path_buf();

    Ok(config_dir)
}

/// Project root: the directory of this crate's manifest.
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Default store directory: `<project root>/data/vectordb`.
pub fn default_db_path() -> PathBuf {
    project_root().join("data").join("vectordb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_under_project_root() {
        let path = default_db_path();
        assert!(path.starts_with(project_root()));
        assert!(path.ends_with("data/vectordb"));
    }
}
