//! Build command - generates the static site

use std::{path::Path, time::Instant};

use blogsmith_generator::Builder;
use color_eyre::eyre::{Result, WrapErr};

use super::{load_config, print_build_stats};

/// Run the build command.
///
/// Builds the site from `source` into `output`.
pub fn run(
    config_path: Option<&Path>,
    source: &Path,
    output: &Path,
    drafts: bool,
    minify: bool,
) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?source, ?output, drafts, minify, "Starting build");

    let config = load_config(config_path, source)?;
    tracing::debug!(?config, "Loaded configuration");

    let stats = Builder::new(config, source, output)
        .include_drafts(drafts)
        .minify(minify)
        .build()
        .wrap_err("Build failed")?;

    print_build_stats(&stats);
    println!("  Output:       {}", output.display());
    println!();

    tracing::info!(?stats, elapsed = ?start.elapsed(), "Build completed successfully");

    Ok(())
}
