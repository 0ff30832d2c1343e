//! This module defines the command-line interface for the application using `clap`.
//!
//! It provides a `Cli` struct that represents the parsed command-line arguments,
//! and a `Commands` enum for the optional subcommands. Running without any
//! arguments performs the full scripted probe.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use policy_probe::commands::{Cli, Commands};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Some(Commands::Init) => { /* write a default config */ }
//!     None => { /* run the probe */ }
//! }
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Represents the parsed command-line arguments.
///
/// Every flag is optional; unset flags fall back to the config file and then to
/// built-in defaults.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, color = clap::ColorChoice::Auto)]
pub struct Cli {
    /// Optional subcommand. Without one the probe runs.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vector store directory (default: <project root>/data/vectordb).
    #[arg(long, value_name = "DIR")]
    pub db_path: Option<PathBuf>,

    /// Collection to open inside the store.
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Embedding model used for queries.
    #[arg(long, value_name = "ID")]
    pub model: Option<String>,

    /// Config file (default: <config dir>/config.yaml).
    #[arg(long, value_name = "FILE", env = "POLICY_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not wait for [Enter] between demonstration queries.
    #[arg(long)]
    pub no_pause: bool,

    /// Enter interactive search without asking.
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Skip the demonstration queries.
    #[arg(long)]
    pub skip_demo: bool,
}

/// Represents the available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Write a default config.yaml into the per-user config directory.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["policy-probe"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.db_path, None);
        assert!(!cli.no_pause);
        assert!(!cli.interactive);
        assert!(!cli.skip_demo);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "policy-probe",
            "--db-path",
            "/srv/vectordb",
            "--collection",
            "policies",
            "--model",
            "text-embedding-3-large",
            "--no-pause",
            "-i",
            "--skip-demo",
        ])
        .unwrap();
        assert_eq!(cli.db_path, Some(PathBuf::from("/srv/vectordb")));
        assert_eq!(cli.collection.as_deref(), Some("policies"));
        assert_eq!(cli.model.as_deref(), Some("text-embedding-3-large"));
        assert!(cli.no_pause);
        assert!(cli.interactive);
        assert!(cli.skip_demo);
    }

    #[test]
    fn test_init_subcommand() {
        let cli = Cli::try_parse_from(["policy-probe", "init"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Init));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
