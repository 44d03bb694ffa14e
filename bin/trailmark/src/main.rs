//! Trailmark CLI
//!
//! Generates the multilingual club website from locale dictionaries, HTML
//! templates and partials.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Trailmark.
#[derive(Parser)]
#[command(
    name = "trailmark",
    version,
    about = "A multilingual static site generator"
)]
struct Cli {
    /// Project root holding locales/, templates/ and partials/
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Path to configuration file, relative to the root (default: trailmark.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Generate every page
    Build {
        /// Output directory, relative to the root (default: the root itself)
        #[arg(long = "out-dir", visible_alias = "outDir")]
        out_dir: Option<PathBuf>,
    },
    /// Build, then rebuild whenever a locale, template or partial changes
    Watch,
    /// Validate locales and templates without writing
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    trailmark::init_tracing(cli.verbose);

    let config = trailmark::load_config(&cli.root, cli.config.as_deref())?;

    match cli.command {
        Commands::Build { out_dir } => {
            trailmark::cmd::build::run(&cli.root, config, out_dir.as_deref())?;
        }
        Commands::Watch => {
            trailmark::cmd::watch::run(&cli.root, config).await?;
        }
        Commands::Check { strict } => {
            trailmark::cmd::check::run(&cli.root, config, strict)?;
        }
    }

    Ok(())
}
