//! Trailmark CLI Library
//!
//! Command implementations for the `trailmark` binary, exposed as a library
//! so they can be driven from tests.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, watch, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use trailmark::cmd;
//!
//! // Build the site into ./dist
//! let config = trailmark::load_config(Path::new("."), None).unwrap();
//! cmd::build::run(Path::new("."), config, Some(Path::new("dist"))).unwrap();
//! ```

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use trailmark_core::{Config, config::CONFIG_FILE};

pub mod cmd;

// Re-export core types for convenience
pub use trailmark_generator::{BuildStats, Builder, SiteInputs};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

/// Load the configuration for a project.
///
/// An explicit `config_path` must exist; otherwise `trailmark.toml` in `root`
/// is used when present and defaults apply when it is not.
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_with_env(&root.join(path))
            .wrap_err_with(|| format!("Failed to load configuration {}", path.display())),
        None => Config::load_or_default(&root.join(CONFIG_FILE))
            .wrap_err("Failed to load configuration"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path(), Some(Path::new("site.toml"))).is_err());
    }

    #[test]
    fn test_load_config_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[site]\nevent_template = \"trip\"\n",
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.site.event_template, "trip");
    }
}
