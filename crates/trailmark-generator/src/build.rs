//! Build orchestration.
//!
//! Renders every (template, locale, variant) combination and writes one
//! `index.html` per page. Output is overwritten in place; nothing is cleaned,
//! since the default output directory is the project root itself.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use thiserror::Error;
use tracing::{debug, info};
use trailmark_core::{Config, language::localized_url};

use crate::{
    assets::{AssetError, AssetManifest, AssetRewriter},
    collector::{CollectorError, SiteInputs},
    template::TemplateContext,
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error while writing output.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input collection error.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Asset manifest error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of templates read.
    pub templates: usize,

    /// Number of locales rendered.
    pub locales: usize,

    /// Number of pages written.
    pub pages: usize,

    /// Whether asset paths were rewritten from a manifest.
    pub rewrote_assets: bool,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// One rendered page, not yet written.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Locale code.
    pub locale: String,

    /// Template the page came from.
    pub template: String,

    /// Trip slug for event pages.
    pub trip: Option<String>,

    /// Path relative to the output directory.
    pub path: PathBuf,

    /// Final HTML.
    pub html: String,
}

/// Site builder that orchestrates the build process.
#[derive(Debug, Clone)]
pub struct Builder {
    config: Config,
    root: PathBuf,
    output_dir: PathBuf,
}

impl Builder {
    /// Create a new builder reading inputs under `root` and writing to
    /// `output_dir`.
    #[must_use]
    pub fn new(config: Config, root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            output_dir: output_dir.into(),
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether output goes somewhere other than the project root.
    ///
    /// Only production builds consult the asset manifest.
    #[must_use]
    pub fn is_production(&self) -> bool {
        match (self.output_dir.canonicalize(), self.root.canonicalize()) {
            (Ok(out), Ok(root)) => out != root,
            _ => self.output_dir != self.root,
        }
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();

        info!(
            root = %self.root.display(),
            output = %self.output_dir.display(),
            "starting build"
        );

        let inputs = SiteInputs::collect(&self.config, &self.root)?;
        let rewriter = self.asset_rewriter()?;

        let mut stats = BuildStats {
            templates: inputs.templates.len(),
            locales: inputs.merged.len(),
            rewrote_assets: rewriter.as_ref().is_some_and(|r| !r.is_empty()),
            ..BuildStats::default()
        };

        for page in self.render_pages(&inputs) {
            let html = match &rewriter {
                Some(rewriter) => rewriter.rewrite(&page.html),
                None => page.html,
            };
            self.write_page(&page.path, &html)?;
            info!(path = %page.path.display(), "generated page");
            stats.pages += 1;
        }

        stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            templates = stats.templates,
            locales = stats.locales,
            pages = stats.pages,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Render every page without writing anything.
    ///
    /// Templates are visited in name order and locales default first, so the
    /// result order is stable.
    #[must_use]
    pub fn render_pages(&self, inputs: &SiteInputs) -> Vec<RenderedPage> {
        let mut pages = Vec::new();

        for template in &inputs.templates {
            let is_event = template.name() == self.config.site.event_template;

            for dict in &inputs.merged {
                let context = TemplateContext::new(&dict.data);

                if !is_event {
                    pages.push(RenderedPage {
                        locale: dict.code.clone(),
                        template: template.name().to_string(),
                        trip: None,
                        path: self.output_path(&dict.code, template.name()),
                        html: template.render(&context),
                    });
                    continue;
                }

                for slug in inputs.locales.rendered_trip_slugs(dict) {
                    let Some(trip) = dict.trip(slug) else {
                        continue;
                    };
                    debug!(locale = %dict.code, slug, "rendering event page");
                    pages.push(RenderedPage {
                        locale: dict.code.clone(),
                        template: template.name().to_string(),
                        trip: Some(slug.to_string()),
                        path: self.output_path(&dict.code, slug),
                        html: template.render(&context.with_trip(slug, trip)),
                    });
                }
            }
        }

        pages
    }

    /// Output path of a page, relative to the output directory.
    #[must_use]
    pub fn output_path(&self, lang: &str, name: &str) -> PathBuf {
        let site = &self.config.site;
        localized_url(lang, name, &site.default_language, &site.index_page)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<PathBuf>()
            .join("index.html")
    }

    /// Load the asset manifest for production builds.
    fn asset_rewriter(&self) -> Result<Option<AssetRewriter>> {
        if !self.is_production() {
            return Ok(None);
        }
        let manifest_path = self.output_dir.join(&self.config.assets.manifest);
        Ok(AssetManifest::load_optional(&manifest_path)?
            .map(|manifest| AssetRewriter::new(&manifest, &self.config.assets)))
    }

    /// Write one page, creating its directories.
    fn write_page(&self, relative: &Path, html: &str) -> Result<()> {
        let path = self.output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, html).map_err(|source| BuildError::Io { path, source })
    }
}
