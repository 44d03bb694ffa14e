//! Localized URL layout.
//!
//! The default locale lives at the site root; every other locale lives under
//! `/<code>/`. Output paths and the language switcher share this convention.

/// Whether `path` starts with the `/<code>` segment.
fn has_prefix(path: &str, code: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(code))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// The locale a site path belongs to.
///
/// Falls back to `default` when no non-default locale prefix matches.
#[must_use]
pub fn current_language<'a>(path: &str, languages: &[&'a str], default: &'a str) -> &'a str {
    languages
        .iter()
        .copied()
        .find(|code| *code != default && has_prefix(path, code))
        .unwrap_or(default)
}

/// Map a site path to the same page in `target`.
#[must_use]
pub fn switch_language(path: &str, target: &str, languages: &[&str], default: &str) -> String {
    let current = current_language(path, languages, default);
    if current == target {
        return path.to_string();
    }

    let stripped = if current == default {
        path
    } else {
        &path[current.len() + 1..]
    };
    let stripped = if stripped.is_empty() { "/" } else { stripped };

    if target == default {
        stripped.to_string()
    } else {
        format!("/{target}{stripped}")
    }
}

/// URL directory of a page: `/`, `/zh/`, `/summer-hike/`, `/zh/summer-hike/`.
#[must_use]
pub fn localized_url(lang: &str, name: &str, default: &str, index_page: &str) -> String {
    let mut url = String::from("/");
    if lang != default {
        url.push_str(lang);
        url.push('/');
    }
    if name != index_page {
        url.push_str(name);
        url.push('/');
    }
    url
}
