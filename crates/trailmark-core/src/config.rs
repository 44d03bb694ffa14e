//! Site configuration management.
//!
//! Every section is optional: a project without `trailmark.toml` builds with
//! the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Conventional configuration file name, looked up in the project root.
pub const CONFIG_FILE: &str = "trailmark.toml";

/// Main configuration structure for Trailmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Input directory layout.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Production asset rewriting.
    #[serde(default)]
    pub assets: AssetsConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Authoritative locale code. Its pages live at the site root.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Template stem that produces one page per trip.
    #[serde(default = "default_event_template")]
    pub event_template: String,

    /// Page name rendered at the locale root instead of a subdirectory.
    #[serde(default = "default_index_page")]
    pub index_page: String,

    /// Trip fields always copied from the default locale.
    #[serde(default = "default_invariant_fields")]
    pub invariant_fields: Vec<String>,
}

/// Input directories, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory of `<code>.json` locale dictionaries.
    #[serde(default = "default_locales_dir")]
    pub locales: PathBuf,

    /// Directory of page templates.
    #[serde(default = "default_templates_dir")]
    pub templates: PathBuf,

    /// Directory of partials. May be absent on disk.
    #[serde(default = "default_partials_dir")]
    pub partials: PathBuf,
}

/// Bundler manifest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Manifest location relative to the output directory.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Manifest entry holding the built stylesheet and script.
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Stylesheet path as authored in templates.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    /// Script entry path as authored in templates.
    #[serde(default = "default_script")]
    pub script: String,
}

// Default value functions
fn default_language() -> String {
    "en".to_string()
}

fn default_event_template() -> String {
    "event".to_string()
}

fn default_index_page() -> String {
    "index".to_string()
}

fn default_invariant_fields() -> Vec<String> {
    [
        "date",
        "times",
        "spotsFilled",
        "spotsTotal",
        "startLat",
        "startLng",
        "endLat",
        "endLng",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_locales_dir() -> PathBuf {
    PathBuf::from("locales")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_partials_dir() -> PathBuf {
    PathBuf::from("partials")
}

fn default_manifest() -> PathBuf {
    PathBuf::from(".vite").join("manifest.json")
}

fn default_entry() -> String {
    "index.html".to_string()
}

fn default_stylesheet() -> String {
    "/src/styles.css".to_string()
}

fn default_script() -> String {
    "/src/main.js".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            event_template: default_event_template(),
            index_page: default_index_page(),
            invariant_fields: default_invariant_fields(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            locales: default_locales_dir(),
            templates: default_templates_dir(),
            partials: default_partials_dir(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            entry: default_entry(),
            stylesheet: default_stylesheet(),
            script: default_script(),
        }
    }
}

impl Config {
    /// Load configuration using the config crate, layering `TRAILMARK__*`
    /// environment variables over the file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        Self::load_layered(path, Self::environment())
    }

    /// Environment source for `TRAILMARK__SECTION__KEY` overrides.
    fn environment() -> config::Environment {
        config::Environment::with_prefix("TRAILMARK").separator("__")
    }

    fn load_layered(path: &Path, environment: config::Environment) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(environment)
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_with_env(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.default_language.is_empty() {
            return Err(CoreError::config("site.default_language cannot be empty"));
        }

        if self.site.event_template.is_empty() {
            return Err(CoreError::config("site.event_template cannot be empty"));
        }

        if self.site.index_page.is_empty() {
            return Err(CoreError::config("site.index_page cannot be empty"));
        }

        if self.site.invariant_fields.is_empty() {
            tracing::warn!("site.invariant_fields is empty; trips will not inherit any fields");
        }

        Ok(())
    }

}
