//! Check command - validate locales and templates without writing

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use trailmark_core::{
    Config,
    locale::{trip_slug, trips},
};
use trailmark_generator::{Builder, SiteInputs, template::unresolved_placeholders};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Loads every input and renders every page in memory, reporting what a
/// build would leave unresolved.
pub fn run(root: &Path, config: Config, strict: bool) -> Result<()> {
    tracing::info!(?root, strict, "Checking locales and templates");

    let mut result = ValidationResult::default();
    let builder = Builder::new(config, root, root);

    println!("Checking inputs...");
    match SiteInputs::collect(builder.config(), root) {
        Ok(inputs) => {
            println!(
                "  ✓ {} locale(s), {} template(s), {} partial(s)",
                inputs.merged.len(),
                inputs.templates.len(),
                inputs.partials.len()
            );

            println!("\nChecking partial references...");
            check_partials(&inputs, &mut result);

            println!("\nChecking trips...");
            check_trips(&inputs, &mut result);

            println!("\nChecking rendered pages...");
            check_rendered(&builder, &inputs, &mut result);
        }
        Err(e) => {
            result.add_error(format!("Cannot load inputs: {e}"));
            println!("  ✗ Inputs invalid: {e}");
        }
    }

    // Print summary
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Partial directives naming no registered partial.
fn check_partials(inputs: &SiteInputs, result: &mut ValidationResult) {
    for template in &inputs.templates {
        for name in inputs.partials.unknown_references(template.content()) {
            result.add_warning(format!(
                "template '{}' includes unknown partial '{name}'",
                template.name()
            ));
        }
    }
}

/// Trips without a slug, and trips the default locale does not define.
fn check_trips(inputs: &SiteInputs, result: &mut ValidationResult) {
    let default = inputs.locales.default_locale();
    let known = default.trip_slugs();

    for dict in inputs.locales.iter() {
        let Some(list) = trips(&dict.data) else {
            continue;
        };
        for (index, trip) in list.iter().enumerate() {
            match trip_slug(trip) {
                None => result.add_warning(format!(
                    "{}: trip #{index} has no non-empty string slug and is never rendered",
                    dict.code
                )),
                Some(slug) if dict.code != default.code && !known.contains(&slug) => {
                    result.add_warning(format!(
                        "{}: trip '{slug}' is not defined in '{}' and is never rendered",
                        dict.code, default.code
                    ));
                }
                Some(_) => {}
            }
        }
    }
}

/// Directives left in the rendered output.
fn check_rendered(builder: &Builder, inputs: &SiteInputs, result: &mut ValidationResult) {
    let pages = builder.render_pages(inputs);
    let mut clean = 0;

    for page in &pages {
        let unresolved = unresolved_placeholders(&page.html);
        if unresolved.is_empty() {
            clean += 1;
            continue;
        }
        for (directive, count) in unresolved {
            result.add_warning(format!(
                "{}: unresolved {directive} ({count}x)",
                page.path.display()
            ));
        }
    }

    println!("  ✓ {clean} of {} page(s) fully resolved", pages.len());
}
