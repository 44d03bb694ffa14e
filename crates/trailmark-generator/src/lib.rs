//! Trailmark Generator Library
//!
//! Static page generation engine for Trailmark.
//!
//! # Modules
//!
//! - [`template`] - Partial registry, iteration blocks and placeholder substitution
//! - [`collector`] - Loading locales, templates and partials for a run
//! - [`assets`] - Production asset path rewriting from the bundler manifest
//! - [`build`] - Build orchestration

pub mod assets;
pub mod build;
pub mod collector;
pub mod template;

pub use assets::{AssetManifest, AssetRewriter};
pub use build::{BuildStats, Builder, RenderedPage};
pub use collector::SiteInputs;
pub use template::{PartialRegistry, Template, TemplateContext};
