//! Input collection.
//!
//! Reads the locale dictionaries, templates and partials of a project once per
//! run. Partials are expanded into the templates here, so later passes never
//! see an inclusion directive that could still resolve.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};
use trailmark_core::{Config, CoreError, LocaleDictionary, LocaleSet};

use crate::template::{PartialRegistry, Template, TemplateError};

/// Input collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Locale or configuration error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Template or partial error.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Everything a run reads from disk.
#[derive(Debug, Clone)]
pub struct SiteInputs {
    /// Locale dictionaries as authored.
    pub locales: LocaleSet,

    /// Dictionaries after the invariant trip merge, default locale first.
    pub merged: Vec<LocaleDictionary>,

    /// Templates with partials already expanded, sorted by name.
    pub templates: Vec<Template>,

    /// Partials of this run.
    pub partials: PartialRegistry,
}

impl SiteInputs {
    /// Load every input under `root` following `config.paths`.
    pub fn collect(config: &Config, root: &Path) -> Result<Self> {
        let locales_dir = root.join(&config.paths.locales);
        let templates_dir = root.join(&config.paths.templates);
        let partials_dir = root.join(&config.paths.partials);

        let locales = LocaleSet::load_dir(&locales_dir, &config.site.default_language)?;
        let partials = PartialRegistry::load_dir(&partials_dir)?;

        let templates: Vec<Template> = Template::load_dir(&templates_dir)?
            .iter()
            .map(|template| {
                for name in partials.unknown_references(template.content()) {
                    warn!(template = template.name(), partial = %name, "unknown partial");
                }
                template.with_partials(&partials)
            })
            .collect();

        let merged = locales
            .iter()
            .map(|dict| locales.merged(dict, &config.site.invariant_fields))
            .collect();

        info!(
            locales = locales.len(),
            templates = templates.len(),
            partials = partials.len(),
            "collected site inputs"
        );
        debug!(codes = ?locales.codes(), "locales");

        Ok(Self {
            locales,
            merged,
            templates,
            partials,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("locales")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(
            root.join("locales/en.json"),
            r#"{ "events": { "trips": [ { "slug": "summer-hike", "date": "2024-07-01" } ] } }"#,
        )
        .unwrap();
        fs::write(
            root.join("locales/zh.json"),
            r#"{ "events": { "trips": [ { "slug": "summer-hike", "date": "wrong" } ] } }"#,
        )
        .unwrap();
        fs::write(root.join("partials/header.html"), "<h1>Site</h1>").unwrap();
        fs::write(root.join("templates/index.html"), "{{> header}}{{> missing}}").unwrap();
        dir
    }

    #[test]
    fn test_collect_expands_partials() {
        let dir = project();
        let inputs = SiteInputs::collect(&Config::default(), dir.path()).unwrap();

        assert_eq!(inputs.templates.len(), 1);
        assert_eq!(inputs.templates[0].content(), "<h1>Site</h1>{{> missing}}");
        assert_eq!(inputs.partials.len(), 1);
    }

    #[test]
    fn test_collect_merges_locales() {
        let dir = project();
        let inputs = SiteInputs::collect(&Config::default(), dir.path()).unwrap();

        let zh = inputs.merged.iter().find(|d| d.code == "zh").unwrap();
        assert_eq!(zh.trip("summer-hike").unwrap()["date"], "2024-07-01");
        assert_eq!(inputs.merged[0].code, "en");
    }

    #[test]
    fn test_collect_without_default_locale() {
        let dir = project();
        fs::remove_file(dir.path().join("locales/en.json")).unwrap();

        let result = SiteInputs::collect(&Config::default(), dir.path());
        assert!(matches!(
            result,
            Err(CollectorError::Core(CoreError::MissingDefaultLocale { .. }))
        ));
    }
}
