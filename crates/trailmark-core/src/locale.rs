//! Locale dictionaries and the trip merge.
//!
//! A locale dictionary is a JSON tree loaded from `<code>.json`. The default
//! locale is authoritative: it decides which trips exist and owns the
//! locale-invariant trip fields (dates, capacity, coordinates).

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};

/// Dotted path of the trip list inside every dictionary.
pub const TRIPS_PATH: &str = "events.trips";

/// One locale's translation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleDictionary {
    /// Locale code, taken from the file stem.
    pub code: String,

    /// Parsed dictionary contents.
    pub data: Value,
}

impl LocaleDictionary {
    /// Create a dictionary from already parsed data.
    #[must_use]
    pub fn new(code: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.into(),
            data,
        }
    }

    /// Load a dictionary from a JSON file; the code is the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let code = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CoreError::config(format!("invalid locale file name: {}", path.display())))?
            .to_string();

        let content = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let data = serde_json::from_str(&content).map_err(|e| CoreError::locale(path, e))?;

        debug!(code = %code, path = %path.display(), "loaded locale");
        Ok(Self { code, data })
    }

    /// Slugs of every trip in this dictionary, in authored order.
    #[must_use]
    pub fn trip_slugs(&self) -> Vec<&str> {
        trips(&self.data)
            .map(|list| list.iter().filter_map(trip_slug).collect())
            .unwrap_or_default()
    }

    /// Find a trip record by slug.
    #[must_use]
    pub fn trip(&self, slug: &str) -> Option<&Value> {
        trips(&self.data)?
            .iter()
            .find(|trip| trip_slug(trip) == Some(slug))
    }
}

/// All dictionaries of one run, the default locale first.
#[derive(Debug, Clone)]
pub struct LocaleSet {
    default: LocaleDictionary,
    others: Vec<LocaleDictionary>,
}

impl LocaleSet {
    /// Build a set from loaded dictionaries.
    ///
    /// Fails when no dictionary has the `default_code`.
    pub fn new(
        default_code: &str,
        dictionaries: Vec<LocaleDictionary>,
        source_dir: &Path,
    ) -> Result<Self> {
        let (mut defaults, others): (Vec<_>, Vec<_>) = dictionaries
            .into_iter()
            .partition(|dict| dict.code == default_code);

        let default = defaults
            .pop()
            .ok_or_else(|| CoreError::MissingDefaultLocale {
                code: default_code.to_string(),
                dir: source_dir.to_path_buf(),
            })?;

        Ok(Self { default, others })
    }

    /// Load every `*.json` file in `dir`, sorted by locale code.
    pub fn load_dir(dir: &Path, default_code: &str) -> Result<Self> {
        let mut files = fs::read_dir(dir)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|e| e.path()))
                    .collect::<std::io::Result<Vec<PathBuf>>>()
            })
            .map_err(|e| CoreError::io(dir, e))?;
        files.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"));
        files.sort();

        let dictionaries = files
            .iter()
            .map(|path| LocaleDictionary::load(path))
            .collect::<Result<Vec<_>>>()?;

        Self::new(default_code, dictionaries, dir)
    }

    /// The authoritative dictionary.
    #[must_use]
    pub fn default_locale(&self) -> &LocaleDictionary {
        &self.default
    }

    /// Every dictionary, default first, the rest sorted by code.
    pub fn iter(&self) -> impl Iterator<Item = &LocaleDictionary> {
        std::iter::once(&self.default).chain(self.others.iter())
    }

    /// Every locale code, default first.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.iter().map(|dict| dict.code.as_str()).collect()
    }

    /// Number of loaded locales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.others.len() + 1
    }

    /// Always false: a set holds at least the default locale.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Merge the invariant trip fields of the default locale into `dict`.
    ///
    /// The default locale itself is returned as is.
    #[must_use]
    pub fn merged(&self, dict: &LocaleDictionary, fields: &[String]) -> LocaleDictionary {
        if dict.code == self.default.code {
            return dict.clone();
        }
        LocaleDictionary::new(
            dict.code.clone(),
            merge_invariant_fields(&self.default.data, dict.data.clone(), fields),
        )
    }

    /// Slugs of the trips `dict` renders: its own trips that the default
    /// locale also defines, in `dict`'s order.
    #[must_use]
    pub fn rendered_trip_slugs<'a>(&self, dict: &'a LocaleDictionary) -> Vec<&'a str> {
        let known = self.default.trip_slugs();
        dict.trip_slugs()
            .into_iter()
            .filter(|slug| {
                let found = known.contains(slug);
                if !found {
                    warn!(locale = %dict.code, slug, "trip missing from default locale, skipping");
                }
                found
            })
            .collect()
    }
}

/// Resolve a dotted path through objects (by key) and arrays (by index).
///
/// Returns `None` as soon as a segment is undefined.
#[must_use]
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Like [`resolve_path`], but a trailing `length` segment on an array or
/// string that has no such key resolves to its length.
///
/// String length counts UTF-16 code units, as browsers report it.
#[must_use]
pub fn resolve_value<'a>(value: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    if let Some(found) = resolve_path(value, path) {
        return Some(Cow::Borrowed(found));
    }

    let parent = match path.strip_suffix("length")? {
        "" => value,
        prefix => resolve_path(value, prefix.strip_suffix('.')?)?,
    };
    let length = match parent {
        Value::Array(items) => items.len(),
        Value::String(text) => text.encode_utf16().count(),
        _ => return None,
    };
    Some(Cow::Owned(Value::from(length)))
}

/// The trip list of a dictionary, when present and an array.
#[must_use]
pub fn trips(data: &Value) -> Option<&Vec<Value>> {
    resolve_path(data, TRIPS_PATH)?.as_array()
}

/// The slug of a trip record, when it is a non-empty string.
#[must_use]
pub fn trip_slug(trip: &Value) -> Option<&str> {
    trip.get("slug")?.as_str().filter(|slug| !slug.is_empty())
}

/// Copy `fields` from the `english` trip records into the matching `target`
/// trips (matched by slug).
///
/// Trips unknown to `english` are untouched, and so are fields `english`
/// does not define. An explicit `null` in `english` counts as defined.
#[must_use]
pub fn merge_invariant_fields(english: &Value, mut target: Value, fields: &[String]) -> Value {
    let Some(english_trips) = trips(english) else {
        return target;
    };

    let Some(target_trips) = target
        .get_mut("events")
        .and_then(|events| events.get_mut("trips"))
        .and_then(Value::as_array_mut)
    else {
        return target;
    };

    for trip in target_trips.iter_mut() {
        let Some(source) = trip_slug(trip)
            .and_then(|slug| english_trips.iter().find(|t| trip_slug(t) == Some(slug)))
        else {
            continue;
        };
        let Some(record) = trip.as_object_mut() else {
            continue;
        };
        for field in fields {
            if let Some(value) = source.get(field) {
                record.insert(field.clone(), value.clone());
            }
        }
    }

    target
}
