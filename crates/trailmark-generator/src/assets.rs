//! Production asset paths.
//!
//! The bundler fingerprints the stylesheet and script and records the hashed
//! names in a JSON manifest. Generated pages reference the source paths; for
//! production output they are rewritten to the hashed ones.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use trailmark_core::config::AssetsConfig;

/// Asset manifest errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON of the expected shape.
    #[error("invalid asset manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// One bundler entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    /// Hashed script file.
    #[serde(default)]
    pub file: Option<String>,

    /// Hashed stylesheets emitted for the entry.
    #[serde(default)]
    pub css: Vec<String>,
}

/// Bundler manifest: entry name to built files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: HashMap<String, ManifestEntry>,
}

impl AssetManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| AssetError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the manifest at `path` if the file exists.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            debug!(path = %path.display(), "no asset manifest");
            return Ok(None);
        }
        let manifest = Self::load(path)?;
        info!(path = %path.display(), entries = manifest.len(), "using asset manifest");
        Ok(Some(manifest))
    }

    /// Get an entry by name.
    #[must_use]
    pub fn get(&self, entry: &str) -> Option<&ManifestEntry> {
        self.entries.get(entry)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrites authored asset references to the manifest's hashed paths.
#[derive(Debug, Clone, Default)]
pub struct AssetRewriter {
    replacements: Vec<(String, String)>,
}

impl AssetRewriter {
    /// Build the rewrites for `config.entry`.
    ///
    /// A missing entry, script or stylesheet produces no rewrite for it.
    #[must_use]
    pub fn new(manifest: &AssetManifest, config: &AssetsConfig) -> Self {
        let mut replacements = Vec::new();

        if let Some(entry) = manifest.get(&config.entry) {
            if let Some(css) = entry.css.first() {
                replacements.push((
                    format!(r#"href="{}""#, config.stylesheet),
                    format!(r#"href="/{css}""#),
                ));
            }
            if let Some(file) = &entry.file {
                replacements.push((
                    format!(r#"src="{}""#, config.script),
                    format!(r#"src="/{file}""#),
                ));
            }
        } else {
            debug!(entry = %config.entry, "manifest has no entry, asset paths unchanged");
        }

        Self { replacements }
    }

    /// Whether any reference would be rewritten.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Apply the rewrites to generated HTML.
    #[must_use]
    pub fn rewrite(&self, html: &str) -> String {
        self.replacements
            .iter()
            .fold(html.to_string(), |acc, (from, to)| acc.replace(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "index.html": {
            "file": "assets/index-4f2a.js",
            "src": "index.html",
            "isEntry": true,
            "css": ["assets/index-9b1c.css"]
        }
    }"#;

    const PAGE: &str = r#"<link rel="stylesheet" href="/src/styles.css"><script type="module" src="/src/main.js"></script>"#;

    #[test]
    fn test_rewrite_both_assets() {
        let manifest = AssetManifest::from_json(MANIFEST).unwrap();
        let rewriter = AssetRewriter::new(&manifest, &AssetsConfig::default());

        assert_eq!(
            rewriter.rewrite(PAGE),
            r#"<link rel="stylesheet" href="/assets/index-9b1c.css"><script type="module" src="/assets/index-4f2a.js"></script>"#
        );
    }

    #[test]
    fn test_rewrite_every_occurrence() {
        let manifest = AssetManifest::from_json(MANIFEST).unwrap();
        let rewriter = AssetRewriter::new(&manifest, &AssetsConfig::default());

        let html = rewriter.rewrite(&format!("{PAGE}{PAGE}"));
        assert_eq!(html.matches("/assets/index-9b1c.css").count(), 2);
        assert!(!html.contains("/src/"));
    }

    #[test]
    fn test_missing_entry_leaves_sources() {
        let manifest = AssetManifest::from_json(r#"{ "other.html": { "file": "x.js" } }"#).unwrap();
        let rewriter = AssetRewriter::new(&manifest, &AssetsConfig::default());

        assert!(rewriter.is_empty());
        assert_eq!(rewriter.rewrite(PAGE), PAGE);
    }

    #[test]
    fn test_entry_without_css() {
        let manifest =
            AssetManifest::from_json(r#"{ "index.html": { "file": "assets/a.js" } }"#).unwrap();
        let html = AssetRewriter::new(&manifest, &AssetsConfig::default()).rewrite(PAGE);

        assert!(html.contains(r#"href="/src/styles.css""#));
        assert!(html.contains(r#"src="/assets/a.js""#));
    }

    #[test]
    fn test_load_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        assert!(AssetManifest::load_optional(&path).unwrap().is_none());

        fs::write(&path, MANIFEST).unwrap();
        let manifest = AssetManifest::load_optional(&path).unwrap().unwrap();
        assert_eq!(manifest.len(), 1);

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AssetManifest::load_optional(&path),
            Err(AssetError::Parse { .. })
        ));
    }
}
