//! Build command - generates the static site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use trailmark_core::Config;
use trailmark_generator::{BuildStats, Builder};

/// Run the build command.
///
/// Writes every page under `out_dir` (relative to `root`), or into `root`
/// itself when no output directory is given.
pub fn run(root: &Path, config: Config, out_dir: Option<&Path>) -> Result<BuildStats> {
    let start = Instant::now();
    let output = out_dir.map_or_else(|| root.to_path_buf(), |dir| root.join(dir));
    tracing::info!(?root, ?output, "Starting build");
    tracing::debug!(?config, "Loaded configuration");

    let builder = Builder::new(config, root, &output);
    let stats = builder.build().wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Templates:  {}", stats.templates);
    println!("  Locales:    {}", stats.locales);
    println!("  Pages:      {}", stats.pages);
    if stats.rewrote_assets {
        println!("  Assets:     rewritten from manifest");
    }
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", builder.output_dir().display());
    println!();

    Ok(stats)
}
