//! Trailmark Core Library
//!
//! Configuration, error handling, locale dictionaries and the localized URL
//! layout for the Trailmark static site generator.

pub mod config;
pub mod error;
pub mod language;
pub mod locale;

pub use config::Config;
pub use error::{CoreError, Result};
pub use locale::{LocaleDictionary, LocaleSet, merge_invariant_fields, resolve_path, resolve_value};
