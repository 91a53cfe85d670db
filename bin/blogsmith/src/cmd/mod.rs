//! Command implementations.

pub mod build;
pub mod check;
pub mod init;
pub mod live;

use std::path::{Path, PathBuf};

use blogsmith_core::SiteConfig;
use blogsmith_generator::BuildStats;
use color_eyre::eyre::{Result, WrapErr};

/// Config file to use: the explicit one, else `<source>/config.json`.
#[must_use]
pub fn config_path(config: Option<&Path>, source: &Path) -> PathBuf {
    config.map_or_else(|| SiteConfig::default_path(source), Path::to_path_buf)
}

/// Load and validate the site configuration.
pub fn load_config(config: Option<&Path>, source: &Path) -> Result<SiteConfig> {
    let path = config_path(config, source);
    tracing::debug!(path = %path.display(), "loading configuration");
    SiteConfig::load(&path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))
}

/// Print build statistics in a user-friendly format.
pub fn print_build_stats(stats: &BuildStats) {
    println!();
    println!("  Build Statistics:");
    println!("  ─────────────────────────────────");
    println!("  Articles:     {:>6}", stats.articles);
    println!("  Pages:        {:>6}", stats.pages);
    println!("  Index pages:  {:>6}", stats.index_pages);
    println!("  Feed items:   {:>6}", stats.feed_items);
    println!("  Media files:  {:>6}", stats.media_files);
    println!("  ─────────────────────────────────");
    println!("  Duration:     {:>6}ms", stats.duration_ms);
    println!();
}
