//! HTML generation for articles, custom pages, index pages and the 404 page.
//!
//! Every output file is one pure render call: an inner template filled from
//! the document, wrapped in the shared `base` template.

use blogsmith_core::SiteConfig;
use quick_xml::escape::escape;
use thiserror::Error;
use tracing::debug;

use crate::{
    index::IndexedArticle,
    links::{LinkError, join_url},
    paginate::{Page, PageNaming},
    template::{TemplateContext, TemplateError, TemplateRegistry},
    transform::Embed,
};

/// Stylesheet of the asciinema player.
const ASCIINEMA_CSS: &str =
    "https://cdn.jsdelivr.net/npm/asciinema-player@3/dist/bundle/asciinema-player.css";

/// Script of the asciinema player.
const ASCIINEMA_JS: &str =
    "https://cdn.jsdelivr.net/npm/asciinema-player@3/dist/bundle/asciinema-player.min.js";

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Building an absolute link for meta data failed.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Encoding a value for an inline script failed.
    #[error("failed to encode script value: {0}")]
    Script(#[from] serde_json::Error),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// A custom page linked from the site navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub title: String,
    /// Output path relative to the site root, e.g. `pages/about.html`.
    pub file: String,
}

/// HTML page generator.
#[derive(Debug)]
pub struct HtmlGenerator {
    templates: TemplateRegistry,
    config: SiteConfig,
    nav: Vec<NavEntry>,
}

impl HtmlGenerator {
    /// Create a new HTML generator with the given configuration.
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        Self {
            templates: TemplateRegistry::new(),
            config,
            nav: Vec::new(),
        }
    }

    /// Set the custom pages shown in the navigation of every page.
    #[must_use]
    pub fn with_nav(mut self, nav: Vec<NavEntry>) -> Self {
        self.nav = nav;
        self
    }

    /// Render a full article page.
    pub fn generate_article(&self, article: &IndexedArticle) -> Result<String> {
        debug!(file = %article.file, "generating article HTML");
        let header = &article.header;

        let mut ctx = TemplateContext::new()
            .with_var("title", escape(header.title.as_str()))
            .with_var("content", article.web.html.as_str());

        let author = article.author(&self.config);
        if !article.human_time.is_empty() || !author.is_empty() {
            ctx.insert("byline", byline_html(article, author));
        }
        if !article.tags.is_empty() {
            ctx.insert("tags_html", tag_links_html(&article.tags, None, &self.config.base_path));
        }
        if let Some(link) = &article.podcast_link {
            ctx.insert(
                "audio",
                format!(
                    r#"<audio controls preload="none" src="{}"></audio>"#,
                    escape(link.as_str())
                ),
            );
        }
        if !self.config.utterances_repo.is_empty() {
            ctx.insert("comments", utterances_html(&self.config.utterances_repo));
        }

        let inner_html = self.templates.render("article", &ctx)?;

        let description = if header.description.is_empty() {
            &self.config.description
        } else {
            &header.description
        };
        let mut base_ctx = self.base_context(&header.title, description, author, &inner_html);
        if self.config.add_optional_meta_data {
            base_ctx.insert(
                "meta",
                self.meta_html(&header.title, description, "article", Some(&article.file))?,
            );
        }
        if !article.web.embeds.is_empty() {
            base_ctx.insert(
                "head_extra",
                format!(r#"<link rel="stylesheet" href="{ASCIINEMA_CSS}">"#),
            );
            base_ctx.insert("scripts", embed_scripts_html(&article.web.embeds)?);
        }

        Ok(self.templates.render("base", &base_ctx)?)
    }

    /// Render a custom page.
    pub fn generate_page(&self, page: &IndexedArticle) -> Result<String> {
        debug!(file = %page.file, "generating page HTML");
        let header = &page.header;

        let ctx = TemplateContext::new()
            .with_var("title", escape(header.title.as_str()))
            .with_var("content", page.web.html.as_str());
        let inner_html = self.templates.render("page", &ctx)?;

        let description = if header.description.is_empty() {
            &self.config.description
        } else {
            &header.description
        };
        let mut base_ctx =
            self.base_context(&header.title, description, &self.config.author, &inner_html);
        if self.config.add_optional_meta_data {
            base_ctx.insert(
                "meta",
                self.meta_html(&header.title, description, "website", Some(&page.file))?,
            );
        }
        if !page.web.embeds.is_empty() {
            base_ctx.insert(
                "head_extra",
                format!(r#"<link rel="stylesheet" href="{ASCIINEMA_CSS}">"#),
            );
            base_ctx.insert("scripts", embed_scripts_html(&page.web.embeds)?);
        }

        Ok(self.templates.render("base", &base_ctx)?)
    }

    /// Render one page of the main index or of a tag index.
    pub fn generate_index(
        &self,
        page: &Page<'_, &IndexedArticle>,
        naming: &PageNaming,
        filter_tag: Option<&str>,
        tags: &[String],
    ) -> Result<String> {
        debug!(file = %page.file_name, page = page.number, tag = ?filter_tag, "generating index HTML");
        let base_path = &self.config.base_path;

        let heading = match filter_tag {
            Some(tag) => format!("Articles tagged “{}”", escape(tag)),
            None => escape(self.config.site_name.as_str()).into_owned(),
        };

        let items_html = page
            .items
            .iter()
            .map(|article| list_item_html(article, base_path))
            .collect::<Vec<_>>()
            .join("\n");

        let mut ctx = TemplateContext::new()
            .with_var("heading", heading)
            .with_var("items", items_html);
        if !tags.is_empty() {
            ctx.insert("tag_filter", tag_filter_html(tags, filter_tag, base_path));
        }
        if let Some(pagination) = pagination_html(page, naming, base_path) {
            ctx.insert("pagination", pagination);
        }

        let inner_html = self.templates.render("index", &ctx)?;

        let title = match filter_tag {
            Some(tag) => format!("{tag} | {}", self.config.site_name),
            None => self.config.site_name.clone(),
        };
        let mut base_ctx = self.base_context(
            &title,
            &self.config.description,
            &self.config.author,
            &inner_html,
        );
        if self.config.add_optional_meta_data {
            base_ctx.insert(
                "meta",
                self.meta_html(&title, &self.config.description, "website", Some(&page.file_name))?,
            );
        }

        Ok(self.templates.render("base", &base_ctx)?)
    }

    /// Render the 404 page.
    pub fn generate_not_found(&self) -> Result<String> {
        let ctx = TemplateContext::new()
            .with_var("home_url", self.config.link_for("index.html"));
        let inner_html = self.templates.render("404", &ctx)?;

        let title = format!("Page not found | {}", self.config.site_name);
        let base_ctx = self.base_context(
            &title,
            &self.config.description,
            &self.config.author,
            &inner_html,
        );

        Ok(self.templates.render("base", &base_ctx)?)
    }

    /// Shared variables of the `base` template.
    fn base_context(
        &self,
        title: &str,
        description: &str,
        author: &str,
        content: &str,
    ) -> TemplateContext {
        let config = &self.config;
        let footer = if config.author.is_empty() {
            escape(config.site_name.as_str()).into_owned()
        } else {
            format!("&copy; {}", escape(config.author.as_str()))
        };

        let mut ctx = TemplateContext::new()
            .with_var("title", escape(title))
            .with_var("description", escape(description))
            .with_var("author", escape(author))
            .with_var("site_name", escape(config.site_name.as_str()))
            .with_var("base_path", config.base_path.as_str())
            .with_var("content", content)
            .with_var("footer", footer);

        if !config.favicon.is_empty() {
            ctx.insert(
                "favicon",
                format!(
                    r#"<link rel="icon" href="{}">"#,
                    escape(config.link_for(&config.favicon))
                ),
            );
        }

        let nav = nav_html(&self.nav, &config.base_path);
        if !nav.is_empty() {
            ctx.insert("nav", nav);
        }

        ctx
    }

    /// Open Graph meta tags.
    fn meta_html(
        &self,
        title: &str,
        description: &str,
        kind: &str,
        file: Option<&str>,
    ) -> Result<String> {
        let mut tags = vec![
            format!(r#"<meta property="og:title" content="{}">"#, escape(title)),
            format!(r#"<meta property="og:type" content="{kind}">"#),
        ];
        if !description.is_empty() {
            tags.push(format!(
                r#"<meta property="og:description" content="{}">"#,
                escape(description)
            ));
        }
        if !self.config.site_name.is_empty() {
            tags.push(format!(
                r#"<meta property="og:site_name" content="{}">"#,
                escape(self.config.site_name.as_str())
            ));
        }
        if let Some(file) = file.filter(|_| !self.config.url.is_empty()) {
            let url = join_url(&self.config.url, file)?;
            tags.push(format!(
                r#"<meta property="og:url" content="{}">"#,
                escape(url)
            ));
        }
        Ok(tags.join("\n    "))
    }
}

/// Navigation links for the custom pages.
fn nav_html(nav: &[NavEntry], base_path: &str) -> String {
    nav.iter()
        .map(|entry| {
            format!(
                r#"<a href="{base_path}/{}">{}</a>"#,
                escape(entry.file.as_str()),
                escape(entry.title.as_str())
            )
        })
        .collect::<Vec<_>>()
        .join("\n                    ")
}

fn byline_html(article: &IndexedArticle, author: &str) -> String {
    let mut parts = Vec::new();
    if !article.human_time.is_empty() {
        parts.push(format!(
            r#"<time datetime="{}">{}</time>"#,
            article.rfc3339_time,
            escape(article.human_time.as_str())
        ));
    }
    if !author.is_empty() {
        parts.push(format!(r#"<span class="author">{}</span>"#, escape(author)));
    }
    format!(r#"<p class="byline">{}</p>"#, parts.join(" · "))
}

/// Links from tags to their index pages.
pub fn tag_links_html(tags: &[String], active: Option<&str>, base_path: &str) -> String {
    let items = tags
        .iter()
        .map(|tag| {
            let class = if active == Some(tag.as_str()) {
                r#" class="active""#
            } else {
                ""
            };
            format!(
                r#"<li><a href="{base_path}/{}" rel="tag"{class}>{}</a></li>"#,
                escape(PageNaming::for_tag(tag).first()),
                escape(tag.as_str())
            )
        })
        .collect::<Vec<_>>()
        .join("");
    format!(r#"<ul class="tags">{items}</ul>"#)
}

/// Tag filter shown above index listings, with a link back to all articles.
fn tag_filter_html(tags: &[String], active: Option<&str>, base_path: &str) -> String {
    let all_class = if active.is_none() { r#" class="active""# } else { "" };
    let links = tag_links_html(tags, active, base_path);
    let all = format!(r#"<li><a href="{base_path}/index.html"{all_class}>all</a></li>"#);
    links.replacen(r#"<ul class="tags">"#, &format!(r#"<ul class="tags">{all}"#), 1)
}

fn utterances_html(repo: &str) -> String {
    format!(
        r#"<script src="https://utteranc.es/client.js" repo="{}" issue-term="pathname" theme="preferred-color-scheme" crossorigin="anonymous" async></script>"#,
        escape(repo)
    )
}

/// Player script plus one `AsciinemaPlayer.create` call per embed.
fn embed_scripts_html(embeds: &[Embed]) -> Result<String> {
    let mut calls = Vec::with_capacity(embeds.len());
    for embed in embeds {
        calls.push(format!(
            "AsciinemaPlayer.create({}, document.getElementById({}));",
            script_string(&embed.src)?,
            script_string(&embed.id)?
        ));
    }
    Ok(format!(
        "<script src=\"{ASCIINEMA_JS}\"></script>\n    <script>\n        {}\n    </script>",
        calls.join("\n        ")
    ))
}

/// JSON string literal that is safe inside an inline `<script>`.
fn script_string(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Generate HTML for one index entry.
pub fn list_item_html(article: &IndexedArticle, base_path: &str) -> String {
    let date_html = if article.human_time.is_empty() {
        String::new()
    } else {
        format!(
            r#"<time datetime="{}">{}</time>"#,
            article.rfc3339_time,
            escape(article.human_time.as_str())
        )
    };

    let description_html = if article.header.description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="post-description">{}</p>"#,
            escape(article.header.description.as_str())
        )
    };

    format!(
        r#"<li class="post-item">
            <div class="post-item-header">
                <a href="{base_path}/{}" class="post-title">{}</a>
                {date_html}
            </div>
            {description_html}
        </li>"#,
        escape(article.file.as_str()),
        escape(article.header.title.as_str()),
    )
}

/// Generate pagination HTML; `None` for a single page.
pub fn pagination_html<T>(page: &Page<'_, T>, naming: &PageNaming, base_path: &str) -> Option<String> {
    if page.last <= 1 {
        return None;
    }

    let link = |number: usize, rel: &str, label: &str| {
        format!(
            r#"<a href="{base_path}/{}" rel="{rel}">{label}</a>"#,
            escape(naming.file_name(number))
        )
    };

    let mut parts = Vec::new();
    if let Some(previous) = page.previous {
        parts.push(format!(
            r#"<a href="{base_path}/{}" rel="first">« First</a>"#,
            escape(page.first_page.as_str())
        ));
        parts.push(link(previous, "prev", "← Previous"));
    }
    parts.push(format!("Page {} of {}", page.number, page.last));
    if let Some(next) = page.next {
        parts.push(link(next, "next", "Next →"));
        parts.push(link(page.last, "last", "Last »"));
    }

    Some(format!(
        r#"<nav class="pagination">{}</nav>"#,
        parts.join(" ")
    ))
}
