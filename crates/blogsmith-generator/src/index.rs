//! Cross-document article index.
//!
//! Collects the parsed and transformed articles of one build, normalizes
//! their tags and provides the publish-date ordering shared by the index
//! pages and the feed.

use std::{collections::BTreeSet, fmt::Write as _};

use blogsmith_core::{DocumentHeader, SiteConfig};
use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use tracing::{debug, warn};

use crate::transform::TransformedBody;

/// Directory that podcast audio must live in.
const MEDIA_DIR: &str = "media";

/// One article prepared for rendering, indexing and syndication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedArticle {
    pub header: DocumentHeader,
    /// Output path relative to the site root, e.g. `articles/hello.html`.
    pub file: String,
    /// Lowercased, trimmed, deduplicated and sorted.
    pub tags: Vec<String>,
    pub web: TransformedBody,
    /// Untransformed body for the feed.
    pub feed_content: String,
    /// Empty when the article has no date.
    pub rfc3339_time: String,
    pub human_time: String,
    /// Source-relative podcast path, only set for files under `media/`.
    pub podcast_audio: Option<String>,
    /// Site link to the podcast file, prefixed with the base path.
    pub podcast_link: Option<String>,
}

impl IndexedArticle {
    /// Assemble an article from its header and both body variants.
    #[must_use]
    pub fn new(
        file: String,
        header: DocumentHeader,
        web: TransformedBody,
        feed_content: String,
        config: &SiteConfig,
    ) -> Self {
        let tags = normalize_tags(&header.tags);
        let (rfc3339_time, human_time) = header
            .published
            .map(|date| (rfc3339(date), human_date(date, &config.date_format)))
            .unwrap_or_default();

        let podcast_audio = header.podcast_audio.as_deref().and_then(|audio| {
            let relative = audio.trim_start_matches('/');
            if relative.starts_with(MEDIA_DIR) {
                Some(relative.to_string())
            } else {
                warn!(file = %file, audio, "podcast-audio must point into media/, ignoring");
                None
            }
        });
        let podcast_link = podcast_audio.as_deref().map(|audio| config.link_for(audio));

        Self {
            header,
            file,
            tags,
            web,
            feed_content,
            rfc3339_time,
            human_time,
            podcast_audio,
            podcast_link,
        }
    }

    /// Publish date, if the article has one.
    #[must_use]
    pub fn published(&self) -> Option<NaiveDate> {
        self.header.published
    }

    /// Author shown for the article: its own, else the site's.
    #[must_use]
    pub fn author<'a>(&'a self, config: &'a SiteConfig) -> &'a str {
        if self.header.author.is_empty() {
            &config.author
        } else {
            &self.header.author
        }
    }
}

/// Lowercase, trim, drop empty entries, sort and deduplicate.
#[must_use]
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn rfc3339(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn human_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
    }
    out
}

/// All articles of one build plus the listing order and tag set.
#[derive(Debug, Clone, Default)]
pub struct ArticleIndex {
    /// Every admitted article, hidden ones included, ordered by file.
    articles: Vec<IndexedArticle>,
    /// Positions of non-hidden articles, newest first.
    listed: Vec<usize>,
    tags: Vec<String>,
}

impl ArticleIndex {
    /// Whether a document takes part in this build at all.
    #[must_use]
    pub fn admits(header: &DocumentHeader, include_drafts: bool) -> bool {
        include_drafts || !header.draft
    }

    /// Build the index.
    ///
    /// Articles are first ordered by output file so that equal dates keep a
    /// stable, input-independent order. Undated articles sort last.
    #[must_use]
    pub fn build(mut articles: Vec<IndexedArticle>) -> Self {
        articles.sort_by(|a, b| a.file.cmp(&b.file));

        let mut listed: Vec<usize> = articles
            .iter()
            .enumerate()
            .filter(|(_, article)| !article.header.hidden)
            .map(|(position, _)| position)
            .collect();
        listed.sort_by(|&a, &b| articles[b].published().cmp(&articles[a].published()));

        let tags: BTreeSet<&String> = listed
            .iter()
            .flat_map(|&position| articles[position].tags.iter())
            .collect();
        let tags: Vec<String> = tags.into_iter().cloned().collect();

        debug!(
            articles = articles.len(),
            listed = listed.len(),
            tags = tags.len(),
            "built article index"
        );

        Self {
            articles,
            listed,
            tags,
        }
    }

    /// Every article, including hidden ones.
    #[must_use]
    pub fn articles(&self) -> &[IndexedArticle] {
        &self.articles
    }

    /// Non-hidden articles, newest first.
    #[must_use]
    pub fn listed(&self) -> Vec<&IndexedArticle> {
        self.listed.iter().map(|&i| &self.articles[i]).collect()
    }

    /// Non-hidden articles carrying `tag`, newest first.
    #[must_use]
    pub fn tagged(&self, tag: &str) -> Vec<&IndexedArticle> {
        self.listed
            .iter()
            .map(|&i| &self.articles[i])
            .filter(|article| article.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Ascending union of the tags of all non-hidden articles.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}
