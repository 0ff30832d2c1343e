//! Main module for the policy-probe CLI.
//!
//! Loads `.env` and the YAML configuration, parses command-line arguments and
//! either writes a default configuration (`init`) or runs the probe against the
//! vector store.
//!
//! # Examples
//!
//! ```sh
//! cargo run --
//! policy-probe --no-pause --interactive
//! policy-probe --db-path ./data/vectordb --collection youth_policies
//! policy-probe init
//! ```

use clap::Parser;
use once_cell::sync::OnceCell;
use policy_probe::{
    api::OpenAiEmbedder,
    commands::{Cli, Commands},
    config::{self, ProbeConfig},
    config_dir,
    probe::{InteractiveMode, ProbeOptions, run_probe},
};
use std::{error::Error, fs, path::PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> Result<(), Box<dyn Error>> {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    });
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run());
    // A pending stdin read would otherwise keep the runtime alive on shutdown.
    runtime.shutdown_background();
    result
}

/// Resolves configuration and dispatches the command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, no API key is
/// available, or the stats step or a demonstration query fails.
async fn run() -> Result<(), Box<dyn Error>> {
    config::load_dotenv();
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        debug!("Initializing configuration");
        return init();
    }

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => config_dir()?.join("config.yaml"),
    };
    debug!("Loading config from: {}", config_path.display());
    let mut probe_config = if cli.config.is_some() {
        config::load_config(&config_path.to_string_lossy())?
    } else {
        config::load_config_or_default(&config_path)?
    };
    probe_config.apply_env();
    apply_cli(&mut probe_config, &cli);
    debug!(
        "Config resolved: db_path={:?} collection={} model={}",
        probe_config.db_path, probe_config.collection_name, probe_config.embedding_model
    );

    let embedder = OpenAiEmbedder::new(&probe_config, probe_config.require_api_key()?)?;
    debug!("Embedding queries with model {}", embedder.model());

    let mut options = ProbeOptions::new(
        probe_config.resolved_db_path(),
        &probe_config.collection_name,
    );
    options.top_k = probe_config.top_k;
    options.embedding_model = Some(embedder.model().to_string());
    options.pause_between = !cli.no_pause;
    if cli.skip_demo {
        options.demo_queries.clear();
    }
    if cli.interactive {
        options.interactive = InteractiveMode::Always;
    }

    let mut input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let outcome = run_probe(&options, &embedder, &mut input, &mut out, interrupt).await?;
    info!("Probe finished: {:?}", outcome);

    Ok(())
}

fn apply_cli(probe_config: &mut ProbeConfig, cli: &Cli) {
    if let Some(db_path) = &cli.db_path {
        probe_config.db_path = Some(db_path.clone());
    }
    if let Some(collection) = &cli.collection {
        probe_config.collection_name = collection.clone();
    }
    if let Some(model) = &cli.model {
        probe_config.embedding_model = model.clone();
    }
}

/// Writes a default `config.yaml` into the configuration directory.
///
/// An existing file is left untouched.
///
/// # Errors
///
/// Returns an error if there is an issue creating the directory or file, or
/// serializing the configuration to YAML.
fn init() -> Result<(), Box<dyn Error>> {
    let config_dir: PathBuf = config_dir()?;
    info!("Creating config directory: {}", config_dir.display());
    fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.yaml");
    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        return Ok(());
    }

    let config_yaml = serde_yaml::to_string(&ProbeConfig::default())?;
    fs::write(&config_path, config_yaml)?;
    println!("Wrote {}", config_path.display());

    Ok(())
}
