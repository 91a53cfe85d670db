//! Check command - validate configuration and content

use std::path::Path;

use blogsmith_generator::Builder;
use color_eyre::eyre::{Result, WrapErr, bail};

use super::config_path;

/// Run the check command.
///
/// Loads the configuration and runs header parsing and content
/// transformation over every document without writing output.
pub fn run(config: Option<&Path>, source: &Path, drafts: bool, strict: bool) -> Result<()> {
    tracing::info!(?config, ?source, strict, "Checking configuration and content");

    println!("Checking configuration...");
    let path = config_path(config, source);
    let site_config = match blogsmith_core::SiteConfig::load(&path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Validation failed: {e}");
        }
    };

    let mut warnings = Vec::new();
    if site_config.site_name.is_empty() {
        warnings.push("SiteName is empty".to_string());
    }
    if site_config.url.is_empty() {
        warnings.push("URL is empty, the feed will have no links".to_string());
    }

    println!("\nChecking documents...");
    // The output directory is never touched by a check.
    let report = Builder::new(site_config, source, source.join(".check"))
        .include_drafts(drafts)
        .check()
        .wrap_err("Failed to read documents")?;
    warnings.extend(report.warnings);
    println!("  {} document(s) inspected", report.documents);

    println!();
    println!("Summary:");
    println!("  Errors:   {}", report.errors.len());
    println!("  Warnings: {}", warnings.len());

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for err in &report.errors {
            println!("  ✗ {err}");
        }
    }

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warn in &warnings {
            println!("  ⚠ {warn}");
        }
    }

    if !report.errors.is_empty() {
        bail!("Validation failed with {} error(s)", report.errors.len());
    }

    if strict && !warnings.is_empty() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}
