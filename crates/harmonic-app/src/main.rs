//! Harmonic - collaborative music project tool
//!
//! Entry point: logging bootstrap, configuration and subcommand dispatch.

mod preview;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harmonic_core::HarmonicConfig;
use harmonic_project::{sample_catalog, ProjectFile, ProjectStore};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "harmonic")]
#[command(about = "Collaborative music project tool", long_about = None)]
struct Cli {
    /// Config file (defaults to $HARMONIC_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a catalog summary
    Summary {
        /// Project file to read instead of the built-in sample catalog
        file: Option<PathBuf>,
    },
    /// Write the sample catalog as a project file
    Export {
        /// Destination path
        file: PathBuf,
    },
    /// Play through the first track of the catalog headlessly
    Preview {
        /// Project file to read instead of the built-in sample catalog
        file: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => HarmonicConfig::load(path),
        None => HarmonicConfig::load_default(),
    }
    .context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Summary { file: None }) {
        Command::Summary { file } => {
            let store = open_catalog(file.as_deref())?;
            print!("{}", report::catalog_summary(&store)?);
        }
        Command::Export { file: path } => {
            let store = sample_catalog().context("Failed to build sample catalog")?;
            ProjectFile::from_store(&store)
                .save_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), projects = store.len(), "Catalog exported");
        }
        Command::Preview { file } => {
            let store = open_catalog(file.as_deref())?;
            let transcript = preview::run(&store, &config).await?;
            print!("{}", transcript);
        }
        Command::Config => {
            println!("{}", config.to_json()?);
        }
    }

    Ok(())
}

/// Load a project file, or fall back to the built-in sample catalog.
fn open_catalog(file: Option<&Path>) -> Result<ProjectStore> {
    match file {
        Some(path) => {
            info!(path = %path.display(), "Opening project file");
            let store = ProjectFile::load_from_file(path)
                .and_then(ProjectFile::into_store)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(store)
        }
        None => sample_catalog().context("Failed to build sample catalog"),
    }
}
