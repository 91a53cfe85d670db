//! RSS feed assembly.
//!
//! Builds an RSS 2.0 channel from the listed articles, in the order the
//! index provides. Article bodies go into `content:encoded` untransformed.

use std::path::{Path, PathBuf};

use blogsmith_core::SiteConfig;
use rss::{
    Category, Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, Item, ItemBuilder,
};
use thiserror::Error;
use tracing::debug;

use crate::{
    index::IndexedArticle,
    links::{LinkError, join_url},
};

/// Feed assembly errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A referenced podcast file does not exist in the source tree.
    #[error("podcast audio '{}' for {article} is missing: {source}", path.display())]
    MissingAsset {
        article: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration lacks something the feed needs.
    #[error("config error: {0}")]
    Config(String),

    /// A link could not be built from the configured URL.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Serializing the channel failed.
    #[error("RSS write error: {0}")]
    Write(#[from] rss::Error),
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Assembles the site feed.
#[derive(Debug)]
pub struct FeedAssembler {
    config: SiteConfig,
    source_dir: PathBuf,
}

impl FeedAssembler {
    /// Create an assembler resolving podcast files against `source_dir`.
    #[must_use]
    pub fn new(config: SiteConfig, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            source_dir: source_dir.into(),
        }
    }

    /// Build the channel for `articles`, keeping their order.
    pub fn assemble(&self, articles: &[&IndexedArticle]) -> Result<Channel> {
        debug!(count = articles.len(), "assembling feed");

        let items = articles
            .iter()
            .map(|article| self.article_to_item(article))
            .collect::<Result<Vec<Item>>>()?;

        let mut builder = ChannelBuilder::default();
        builder
            .title(self.config.site_name.as_str())
            .link(self.config.url.as_str())
            .description(self.config.description.as_str())
            .items(items);

        if !self.config.email.is_empty() {
            builder.managing_editor(format_author(&self.config.author, &self.config.email));
        }
        if let Some(created) = self.config.creation_date() {
            builder.pub_date(created.to_rfc2822());
        }

        Ok(builder.build())
    }

    /// Build and serialize the feed.
    pub fn render(&self, articles: &[&IndexedArticle]) -> Result<String> {
        let channel = self.assemble(articles)?;
        let bytes = channel.write_to(Vec::new())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn article_to_item(&self, article: &IndexedArticle) -> Result<Item> {
        let header = &article.header;
        let mut builder = ItemBuilder::default();
        builder
            .title(header.title.clone())
            .content(article.feed_content.clone());

        if !header.description.is_empty() {
            builder.description(header.description.clone());
        }

        if let Some(author) = self.item_author(article) {
            builder.author(author);
        }

        if let Some(date) = header.published {
            builder.pub_date(date.and_time(chrono::NaiveTime::MIN).and_utc().to_rfc2822());
        }

        if !self.config.url.is_empty() {
            let link = join_url(&self.config.url, &article.file)?;
            builder.guid(GuidBuilder::default().value(link.clone()).permalink(true).build());
            builder.link(link);
        }

        let categories: Vec<Category> = article
            .tags
            .iter()
            .map(|tag| Category {
                name: tag.clone(),
                domain: None,
            })
            .collect();
        if !categories.is_empty() {
            builder.categories(categories);
        }

        if let Some(audio) = &article.podcast_audio {
            builder.enclosure(self.enclosure(article, audio)?);
        }

        Ok(builder.build())
    }

    /// Author line: the article's name overrides the site author, the site
    /// email is used only when the article has none.
    fn item_author(&self, article: &IndexedArticle) -> Option<String> {
        let header = &article.header;
        let name = if header.author.is_empty() {
            self.config.author.as_str()
        } else {
            header.author.as_str()
        };
        let email = if header.author_email.is_empty() {
            self.config.email.as_str()
        } else {
            header.author_email.as_str()
        };

        // Without an article author or a site email there is no author to report.
        if header.author.is_empty() && header.author_email.is_empty() && self.config.email.is_empty()
        {
            return None;
        }
        Some(format_author(name, email)).filter(|author| !author.is_empty())
    }

    fn enclosure(&self, article: &IndexedArticle, audio: &str) -> Result<rss::Enclosure> {
        if self.config.url.is_empty() {
            return Err(FeedError::Config(format!(
                "URL must be configured to publish podcast audio for {}",
                article.file
            )));
        }

        let path = self.source_dir.join(audio);
        let metadata = std::fs::metadata(&path).map_err(|source| FeedError::MissingAsset {
            article: article.file.clone(),
            path: path.clone(),
            source,
        })?;

        Ok(EnclosureBuilder::default()
            .url(join_url(&self.config.url, audio)?)
            .length(metadata.len().to_string())
            .mime_type(audio_mime_type(&path))
            .build())
    }
}

/// `email (name)`, or whichever part is present.
#[must_use]
pub fn format_author(name: &str, email: &str) -> String {
    match (name.is_empty(), email.is_empty()) {
        (false, false) => format!("{email} ({name})"),
        (true, false) => email.to_string(),
        (false, true) => name.to_string(),
        (true, true) => String::new(),
    }
}

/// MIME type of an audio file, by extension.
#[must_use]
pub fn audio_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("m4a" | "mp4" | "aac") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        _ => "audio/mpeg",
    }
}
