//! Site configuration management.

use std::{fmt::Write as _, num::NonZeroUsize, path::Path};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// File name looked up inside the source directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Site-wide configuration.
///
/// Keys are PascalCase in the config file (`SiteName`, `MaxIndexEntries`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteConfig {
    /// Path prefix the site is served under, normalized to `/segment` or empty.
    #[serde(default)]
    pub base_path: String,

    /// Site name used in titles, the header and the feed channel.
    #[serde(default)]
    pub site_name: String,

    /// Default author name.
    #[serde(default)]
    pub author: String,

    /// Absolute site URL (e.g. `https://example.com/blog`), used by the feed.
    #[serde(default, rename = "URL")]
    pub url: String,

    /// Site description for meta tags and the feed channel.
    #[serde(default)]
    pub description: String,

    /// chrono strftime pattern for human-readable dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Contact email; enables the feed's managing editor.
    #[serde(default)]
    pub email: String,

    /// RFC3339 timestamp of the feed's creation.
    #[serde(default)]
    pub creation_date: String,

    /// GitHub repository backing Utterances comments (`owner/repo`).
    #[serde(default)]
    pub utterances_repo: String,

    /// Number of articles per index page.
    #[serde(default = "default_max_index_entries")]
    pub max_index_entries: usize,

    /// Emit Open Graph meta tags on every page.
    #[serde(default)]
    pub add_optional_meta_data: bool,

    /// Favicon file name; filled in by the build when one is copied.
    #[serde(default)]
    pub favicon: String,
}

fn default_date_format() -> String {
    "%-d %B %Y".to_string()
}

fn default_max_index_entries() -> usize {
    10
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            site_name: String::new(),
            author: String::new(),
            url: String::new(),
            description: String::new(),
            date_format: default_date_format(),
            email: String::new(),
            creation_date: String::new(),
            utterances_repo: String::new(),
            max_index_entries: default_max_index_entries(),
            add_optional_meta_data: false,
            favicon: String::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a JSON or TOML file.
    ///
    /// The format is picked from the file extension; anything other than
    /// `.toml` is read as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let mut config: SiteConfig = if is_toml {
            toml::from_str(&content).map_err(|e| {
                CoreError::config_with_source(
                    format!("Failed to parse config file: {}", path.display()),
                    e,
                )
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                CoreError::config_with_source(
                    format!("Failed to parse config file: {}", path.display()),
                    e,
                )
            })?
        };

        config.normalize();
        config.validate()?;
        tracing::debug!(path = %path.display(), site = %config.site_name, "loaded configuration");
        Ok(config)
    }

    /// Resolve the config path for a source directory.
    #[must_use]
    pub fn default_path(source_dir: &Path) -> std::path::PathBuf {
        source_dir.join(DEFAULT_CONFIG_FILE)
    }

    /// Normalize `BasePath` to a single leading slash and no trailing slash.
    pub fn normalize(&mut self) {
        let trimmed = self.base_path.trim_matches(['/', '\\']);
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.max_index_entries == 0 {
            return Err(CoreError::config("MaxIndexEntries must be at least 1"));
        }

        if !self.creation_date.is_empty() {
            DateTime::parse_from_rfc3339(&self.creation_date).map_err(|e| {
                CoreError::config_with_source(
                    format!("CreationDate '{}' is not RFC3339", self.creation_date),
                    e,
                )
            })?;
        }

        // chrono reports unknown specifiers through fmt::Error instead of at parse time.
        let probe = NaiveDate::from_ymd_opt(2006, 1, 2).unwrap_or_default();
        let mut scratch = String::new();
        if write!(scratch, "{}", probe.format(&self.date_format)).is_err() {
            return Err(CoreError::config(format!(
                "DateFormat '{}' is not a valid format string",
                self.date_format
            )));
        }

        if self.site_name.is_empty() {
            tracing::warn!("SiteName is empty");
        }

        Ok(())
    }

    /// Articles per index page.
    #[must_use]
    pub fn page_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_index_entries).unwrap_or(NonZeroUsize::MIN)
    }

    /// Parsed feed creation date, if configured and valid.
    #[must_use]
    pub fn creation_date(&self) -> Option<DateTime<FixedOffset>> {
        if self.creation_date.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(&self.creation_date).ok()
    }

    /// Site-relative link for an output file, prefixed with the base path.
    #[must_use]
    pub fn link_for(&self, file: &str) -> String {
        format!("{}/{}", self.base_path, file.trim_start_matches('/'))
    }
}
