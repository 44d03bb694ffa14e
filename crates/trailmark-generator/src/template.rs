//! HTML template expansion.
//!
//! Templates use a deliberately small placeholder language:
//!
//! - `{{> name}}` includes the partial `name`.
//! - `{{#each path}} ... {{/each}}` repeats its body for every element of the
//!   array at `path`. The body sees `{{@index}}` and `{{trip.field}}` (when the
//!   path ends in `trips`) or `{{item.field}}` (any other path).
//! - `{{#each trip.field}} ... {{/each}}` repeats its body for every element of
//!   a field of the selected trip, substituting `{{this}}`.
//! - `{{trip.field}}` reads the selected trip on event pages.
//! - `{{dotted.path}}` reads the locale dictionary.
//! - `TRIP_SLUG` is replaced with the selected trip's slug.
//!
//! Matching is regex based and therefore not recursive: a block ends at the
//! first `{{/each}}`, so blocks cannot nest. Partial bodies are not scanned for
//! further inclusions. Paths are taken literally (`{{ title }}` looks up the
//! key `" title "`). Anything that does not resolve is left verbatim so it
//! stays visible in the output.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use trailmark_core::{resolve_path, resolve_value};

/// Literal token replaced by the current trip's slug.
pub const TRIP_SLUG_MARKER: &str = "TRIP_SLUG";

static PARTIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{>\s*([A-Za-z0-9_-]+)\s*\}\}").expect("partial pattern is valid")
});

static EACH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#each ([^}]+)\}\}(.*?)\{\{/each\}\}").expect("each pattern is valid")
});

static TRIP_EACH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#each trip\.([A-Za-z0-9_]+)\}\}(.*?)\{\{/each\}\}")
        .expect("trip each pattern is valid")
});

static TRIP_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{trip\.([^}]+)\}\}").expect("trip field pattern is valid")
});

static ITEM_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{item\.([^}]+)\}\}").expect("item field pattern is valid")
});

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"));

/// Template loading errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// IO error while reading a template or partial.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory listing failed.
    #[error("cannot list directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// List the `*.html` files directly inside `dir`, sorted by file name.
fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "html") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Read a file and return its stem with its contents.
fn read_named(path: &Path) -> Result<(String, String)> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((name, content))
}

/// Partials available to one run, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct PartialRegistry {
    partials: HashMap<String, String>,
}

impl PartialRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.html` file in `dir`. A missing directory yields an empty
    /// registry.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::new();
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "no partials directory");
            return Ok(registry);
        }

        for path in html_files(dir)? {
            let (name, body) = read_named(&path)?;
            debug!(partial = %name, "loaded partial");
            registry.register(name, body);
        }
        Ok(registry)
    }

    /// Register a partial, replacing any previous body with the same name.
    pub fn register(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.partials.insert(name.into(), body.into());
    }

    /// Get a partial body by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.partials.get(name).map(String::as_str)
    }

    /// Number of registered partials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partials.len()
    }

    /// Whether no partial is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    /// Replace every `{{> name}}` with the registered body.
    ///
    /// Unknown names keep their directive text.
    #[must_use]
    pub fn expand(&self, template: &str) -> String {
        PARTIAL_RE
            .replace_all(template, |caps: &Captures| {
                self.get(&caps[1]).unwrap_or(&caps[0]).to_string()
            })
            .into_owned()
    }

    /// Names referenced by `{{> name}}` that are not registered, deduplicated.
    #[must_use]
    pub fn unknown_references(&self, template: &str) -> Vec<String> {
        let mut unknown: Vec<String> = PARTIAL_RE
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .filter(|name| !self.partials.contains_key(name))
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }
}

/// The data a template is rendered against.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    data: &'a Value,
    trip: Option<(&'a str, &'a Value)>,
}

impl<'a> TemplateContext<'a> {
    /// Render against a locale dictionary.
    #[must_use]
    pub fn new(data: &'a Value) -> Self {
        Self { data, trip: None }
    }

    /// Select a trip for event pages.
    #[must_use]
    pub fn with_trip(mut self, slug: &'a str, record: &'a Value) -> Self {
        self.trip = Some((slug, record));
        self
    }
}

/// A page template, named by its file stem.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Load every `*.html` template in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>> {
        html_files(dir)?
            .iter()
            .map(|path| read_named(path).map(|(name, content)| Self::new(name, content)))
            .collect()
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the raw template text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// A copy of this template with its partials expanded.
    #[must_use]
    pub fn with_partials(&self, partials: &PartialRegistry) -> Self {
        Self::new(self.name.clone(), partials.expand(&self.content))
    }

    /// Render the template.
    ///
    /// Trip passes run first so a trip's values win over same-named
    /// dictionary paths.
    #[must_use]
    pub fn render(&self, context: &TemplateContext<'_>) -> String {
        let mut text = self.content.clone();

        if let Some((slug, trip)) = context.trip {
            text = text.replace(TRIP_SLUG_MARKER, slug);
            text = expand_trip_each_blocks(&text, trip);
            text = resolve_trip_placeholders(&text, trip);
        }

        text = expand_each_blocks(&text, context.data);
        resolve_placeholders(&text, context.data)
    }
}

/// Item variable name for an `{{#each path}}` block.
#[must_use]
pub fn item_name(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("trips") => "trip",
        _ => "item",
    }
}

/// Text form of a resolved value.
///
/// Strings are inserted as is, numbers without a trailing `.0`, booleans as
/// `true`/`false`; `null`, arrays and objects become compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Substitute `pattern`'s first capture as a path into `data`.
fn substitute(pattern: &Regex, text: &str, data: &Value) -> String {
    pattern
        .replace_all(text, |caps: &Captures| match resolve_value(data, &caps[1]) {
            Some(value) => render_value(&value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Expand `{{#each path}}` blocks against `data`.
///
/// A path that does not resolve to an array leaves its block untouched.
#[must_use]
pub fn expand_each_blocks(template: &str, data: &Value) -> String {
    EACH_RE
        .replace_all(template, |caps: &Captures| {
            let path = &caps[1];
            let Some(items) = resolve_path(data, path).and_then(Value::as_array) else {
                return caps[0].to_string();
            };

            let field_re: &Regex = if item_name(path) == "trip" {
                &*TRIP_FIELD_RE
            } else {
                &*ITEM_FIELD_RE
            };
            let body = &caps[2];

            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let text = body.replace("{{@index}}", &index.to_string());
                    substitute(field_re, &text, item)
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .into_owned()
}

/// Expand `{{#each trip.field}}` blocks over the selected trip's arrays.
#[must_use]
pub fn expand_trip_each_blocks(template: &str, trip: &Value) -> String {
    TRIP_EACH_RE
        .replace_all(template, |caps: &Captures| {
            let Some(items) = trip.get(&caps[1]).and_then(Value::as_array) else {
                return caps[0].to_string();
            };
            let body = &caps[2];

            items
                .iter()
                .map(|item| body.replace("{{this}}", &render_value(item)))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .into_owned()
}

/// Replace `{{trip.field}}` with the selected trip's values.
#[must_use]
pub fn resolve_trip_placeholders(template: &str, trip: &Value) -> String {
    substitute(&TRIP_FIELD_RE, template, trip)
}

/// Replace `{{dotted.path}}` with values from `data`.
#[must_use]
pub fn resolve_placeholders(template: &str, data: &Value) -> String {
    substitute(&PLACEHOLDER_RE, template, data)
}

/// Every `{{...}}` directive left in rendered text, with its occurrence count.
#[must_use]
pub fn unresolved_placeholders(text: &str) -> BTreeMap<String, usize> {
    let mut found = BTreeMap::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        *found.entry(caps[0].to_string()).or_insert(0) += 1;
    }
    found
}
