// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photofx::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photofx")]
#[command(about = "Apply catalog-driven color filters to images")]
#[command(version)]
struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Filter catalog to use instead of the configured or embedded one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Use the CPU reference backends instead of the GPU
    #[arg(long, global = true)]
    cpu: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the filters in the catalog
    List,

    /// Apply one filter to an image
    Apply {
        /// Filter id (from 'photofx list')
        #[arg(short, long, conflicts_with = "index")]
        filter: Option<String>,

        /// Filter position in catalog order
        #[arg(short, long)]
        index: Option<usize>,

        /// Input image
        input: PathBuf,

        /// Output image; the format follows the extension
        output: PathBuf,
    },

    /// Render a thumbnail of an image through every filter
    Previews {
        /// Input image
        input: PathBuf,

        /// Directory for the preview files
        #[arg(short, long, default_value = "previews")]
        output_dir: PathBuf,

        /// Longest preview side in pixels (default: from config)
        #[arg(short, long)]
        size: Option<u32>,
    },

    /// Check a catalog file without falling back to the built-in table
    Validate {
        /// Catalog file (default: --catalog, the config, or the embedded catalog)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Read the config before logging is up so its filter can seed the default
    let loaded = cli.config.as_deref().map(Config::load);
    let mut config = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => Config::default(),
    };

    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photofx=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(true)
        .with_level(true)
        .init();

    if let Some(Err(e)) = loaded {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
    }

    if let Some(path) = cli.catalog {
        config.catalog_path = Some(path);
    }
    if cli.cpu {
        config.render_device = photofx::RenderDevice::Cpu;
    }

    match cli.command {
        Commands::List => cli::list_filters(&config),
        Commands::Apply {
            filter,
            index,
            input,
            output,
        } => cli::apply_filter(config, filter, index, &input, &output).await,
        Commands::Previews {
            input,
            output_dir,
            size,
        } => cli::render_previews(config, &input, &output_dir, size).await,
        Commands::Validate { path } => cli::validate_catalog(&config, path),
    }
}
