//! Build orchestration.
//!
//! Coordinates the full site build: per-document parsing, transformation and
//! rendering on the rayon pool, then indexing, pagination and the feed once
//! every document is known.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use blogsmith_core::{HeaderError, SiteConfig, header};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    feed::{FeedAssembler, FeedError},
    html::{HtmlError, HtmlGenerator, NavEntry},
    index::{ArticleIndex, IndexedArticle},
    output::{self, OutputError},
    paginate::{PageNaming, paginate},
    template::BASE_CSS,
    transform::{TransformError, transform_for_web},
};

/// Source subdirectory holding articles.
pub const ARTICLES_DIR: &str = "articles";

/// Source subdirectory holding custom pages.
pub const PAGES_DIR: &str = "pages";

/// Source subdirectory copied verbatim into the output.
pub const MEDIA_DIR: &str = "media";

/// Extension of source documents; other files are ignored.
const DOCUMENT_EXTENSION: &str = "html";

/// Why one output could not be produced.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Output(#[from] OutputError),

    /// Two tags map to the same index file name.
    #[error("index page for tag '{tag}' would overwrite '{file}'")]
    IndexCollision { tag: String, file: String },
}

/// A failed document or output file.
#[derive(Debug, Error)]
#[error("{}: {source}", path.display())]
pub struct BuildFailure {
    pub path: PathBuf,
    #[source]
    pub source: DocumentError,
}

impl BuildFailure {
    fn new(path: impl Into<PathBuf>, source: impl Into<DocumentError>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Reading the source tree failed.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Preparing the output tree failed.
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Some outputs failed; everything else was still written.
    #[error("build incomplete, {} output(s) failed:\n{}", failures.len(), format_failures(failures))]
    Incomplete { failures: Vec<BuildFailure> },
}

fn format_failures(failures: &[BuildFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("  - {failure}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Articles rendered, hidden ones included.
    pub articles: usize,

    /// Custom pages rendered.
    pub pages: usize,

    /// Index pages written, tag indexes included.
    pub index_pages: usize,

    /// Items in the feed.
    pub feed_items: usize,

    /// Files copied from `media/`.
    pub media_files: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Result of validating a source tree without writing output.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Documents inspected.
    pub documents: usize,
    pub errors: Vec<BuildFailure>,
    pub warnings: Vec<String>,
}

impl CheckReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Documents of one kind after the per-document phase.
#[derive(Debug, Default)]
struct Prepared {
    documents: Vec<IndexedArticle>,
    failures: Vec<BuildFailure>,
}

/// Site builder that orchestrates the build process.
#[derive(Debug, Clone)]
pub struct Builder {
    config: SiteConfig,
    source_dir: PathBuf,
    output_dir: PathBuf,
    include_drafts: bool,
    minify: bool,
}

impl Builder {
    /// Create a new builder.
    #[must_use]
    pub fn new(
        config: SiteConfig,
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            include_drafts: false,
            minify: false,
        }
    }

    /// Render documents marked as drafts.
    #[must_use]
    pub fn include_drafts(mut self, include: bool) -> Self {
        self.include_drafts = include;
        self
    }

    /// Minify every generated HTML page.
    #[must_use]
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();
        let mut failures = Vec::new();

        info!(
            source = %self.source_dir.display(),
            output = %self.output_dir.display(),
            drafts = self.include_drafts,
            minify = self.minify,
            "starting build"
        );

        let article_files = list_documents(&self.source_dir.join(ARTICLES_DIR), true)?;
        let page_files = list_documents(&self.source_dir.join(PAGES_DIR), false)?;

        output::cleanup(&self.output_dir)?;
        output::prepare(&self.output_dir)?;

        let mut config = self.config.clone();
        match output::copy_favicon(&self.source_dir, &self.output_dir) {
            Ok(Some(name)) => {
                debug!(favicon = name, "using favicon");
                config.favicon = name.to_string();
            }
            Ok(None) => {
                warn!("neither favicon.ico nor favicon.png found, pages will have no favicon");
                config.favicon.clear();
            }
            Err(e) => {
                config.favicon.clear();
                failures.push(BuildFailure::new(self.source_dir.join("favicon"), e));
            }
        }

        // 1. Parse and transform every document
        let pages = self.prepare_documents(PAGES_DIR, &page_files, &config);
        let articles = self.prepare_documents(ARTICLES_DIR, &article_files, &config);
        failures.extend(pages.failures);
        failures.extend(articles.failures);

        let nav: Vec<NavEntry> = pages
            .documents
            .iter()
            .filter(|page| !page.header.hidden)
            .map(|page| NavEntry {
                title: page.header.title.clone(),
                file: page.file.clone(),
            })
            .collect();
        let generator = HtmlGenerator::new(config.clone()).with_nav(nav);

        // 2. Render articles and pages
        info!(
            articles = articles.documents.len(),
            pages = pages.documents.len(),
            "rendering documents"
        );
        let (written, page_failures) = self.render_all(&pages.documents, |page| {
            generator.generate_page(page)
        });
        stats.pages = written;
        failures.extend(page_failures);

        let (written, article_failures) = self.render_all(&articles.documents, |article| {
            generator.generate_article(article)
        });
        stats.articles = written;
        failures.extend(article_failures);

        // 3. Index pages
        let index = ArticleIndex::build(articles.documents);
        let listed = index.listed();
        let mut claimed = HashSet::new();
        stats.index_pages += self.write_index(
            &generator,
            &listed,
            None,
            index.tags(),
            &mut claimed,
            &mut failures,
        );
        for tag in index.tags() {
            let tagged = index.tagged(tag);
            stats.index_pages += self.write_index(
                &generator,
                &tagged,
                Some(tag),
                index.tags(),
                &mut claimed,
                &mut failures,
            );
        }

        // 4. Feed
        let feed_path = self.output_dir.join("feed.xml");
        let feed = FeedAssembler::new(config.clone(), &self.source_dir)
            .render(&listed)
            .map_err(DocumentError::from)
            .and_then(|xml| {
                output::write_atomic(&feed_path, xml.as_bytes()).map_err(DocumentError::from)
            });
        match feed {
            Ok(()) => {
                stats.feed_items = listed.len();
                info!(path = %feed_path.display(), items = listed.len(), "generated feed");
            }
            Err(e) => failures.push(BuildFailure::new(feed_path, e)),
        }

        // 5. Static assets and 404
        let css_path = self.output_dir.join("base.css");
        if let Err(e) = output::write_atomic(&css_path, BASE_CSS.as_bytes()) {
            failures.push(BuildFailure::new(css_path, e));
        }

        match output::copy_tree(
            &self.source_dir.join(MEDIA_DIR),
            &self.output_dir.join(MEDIA_DIR),
        ) {
            Ok(copied) => stats.media_files = copied,
            Err(e) => failures.push(BuildFailure::new(self.source_dir.join(MEDIA_DIR), e)),
        }

        let not_found_path = self.output_dir.join("404.html");
        if let Err(e) = generator
            .generate_not_found()
            .map_err(DocumentError::from)
            .and_then(|html| self.write_html(&not_found_path, html))
        {
            failures.push(BuildFailure::new(not_found_path, e));
        }

        stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !failures.is_empty() {
            warn!(failed = failures.len(), "build finished with failures");
            return Err(BuildError::Incomplete { failures });
        }

        info!(
            articles = stats.articles,
            pages = stats.pages,
            index_pages = stats.index_pages,
            feed_items = stats.feed_items,
            media_files = stats.media_files,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Parse and transform every document without writing anything.
    pub fn check(&self) -> Result<CheckReport> {
        let article_files = list_documents(&self.source_dir.join(ARTICLES_DIR), true)?;
        let page_files = list_documents(&self.source_dir.join(PAGES_DIR), false)?;

        let mut report = CheckReport {
            documents: article_files.len() + page_files.len(),
            ..CheckReport::default()
        };

        let pages = self.prepare_documents(PAGES_DIR, &page_files, &self.config);
        let articles = self.prepare_documents(ARTICLES_DIR, &article_files, &self.config);
        report.errors.extend(pages.failures);
        report.errors.extend(articles.failures);

        if !has_favicon(&self.source_dir) {
            report
                .warnings
                .push("neither favicon.ico nor favicon.png found".to_string());
        }

        for document in pages.documents.iter().chain(&articles.documents) {
            if document.header.title.trim().is_empty() {
                report.warnings.push(format!("{}: title is empty", document.file));
            }
            if document.header.podcast_audio.is_some() && document.podcast_audio.is_none() {
                report.warnings.push(format!(
                    "{}: podcast-audio does not point into {MEDIA_DIR}/ and is ignored",
                    document.file
                ));
            }
        }

        let feed = FeedAssembler::new(self.config.clone(), &self.source_dir);
        for article in &articles.documents {
            if article.published().is_none() {
                report
                    .warnings
                    .push(format!("{}: no date, it will be listed last", article.file));
            }
            if !article.header.hidden {
                if let Err(e) = feed.assemble(&[article]) {
                    report.errors.push(BuildFailure::new(&article.file, e));
                }
            }
        }

        info!(
            documents = report.documents,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "check complete"
        );
        Ok(report)
    }

    /// Parse and transform the documents of one source directory in parallel.
    fn prepare_documents(&self, dir: &str, files: &[PathBuf], config: &SiteConfig) -> Prepared {
        let results: Vec<_> = files
            .par_iter()
            .map(|path| self.prepare_document(dir, path, config))
            .collect();

        let mut prepared = Prepared::default();
        for result in results {
            match result {
                Ok(Some(document)) => prepared.documents.push(document),
                Ok(None) => {}
                Err(failure) => {
                    warn!(error = %failure, "failed to prepare document");
                    prepared.failures.push(failure);
                }
            }
        }
        prepared
    }

    fn prepare_document(
        &self,
        dir: &str,
        path: &Path,
        config: &SiteConfig,
    ) -> std::result::Result<Option<IndexedArticle>, BuildFailure> {
        let parsed = header::parse_file(path).map_err(|e| BuildFailure::new(path, e))?;

        if !ArticleIndex::admits(&parsed.header, self.include_drafts) {
            debug!(path = %path.display(), "skipping draft");
            return Ok(None);
        }

        let web = transform_for_web(&parsed.body).map_err(|e| BuildFailure::new(path, e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = format!("{dir}/{name}");
        debug!(file = %file, embeds = web.embeds.len(), "prepared document");

        Ok(Some(IndexedArticle::new(
            file,
            parsed.header,
            web,
            parsed.body,
            config,
        )))
    }

    /// Render and write documents in parallel; returns the number written.
    fn render_all<F>(
        &self,
        documents: &[IndexedArticle],
        render: F,
    ) -> (usize, Vec<BuildFailure>)
    where
        F: Fn(&IndexedArticle) -> std::result::Result<String, HtmlError> + Sync,
    {
        let results: Vec<_> = documents
            .par_iter()
            .map(|document| {
                let path = self.output_dir.join(&document.file);
                render(document)
                    .map_err(DocumentError::from)
                    .and_then(|html| self.write_html(&path, html))
                    .map_err(|e| BuildFailure::new(path, e))
            })
            .collect();

        let mut written = 0;
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(()) => written += 1,
                Err(failure) => {
                    warn!(error = %failure, "failed to write document");
                    failures.push(failure);
                }
            }
        }
        (written, failures)
    }

    /// Write every page of one index; returns the number of pages written.
    ///
    /// File names already in `claimed` are never overwritten; a page that
    /// would reuse one is recorded as a failure.
    fn write_index(
        &self,
        generator: &HtmlGenerator,
        articles: &[&IndexedArticle],
        tag: Option<&str>,
        tags: &[String],
        claimed: &mut HashSet<String>,
        failures: &mut Vec<BuildFailure>,
    ) -> usize {
        let naming = tag.map_or_else(PageNaming::main, PageNaming::for_tag);
        let mut written = 0;

        for page in paginate(articles, self.config.page_size(), &naming) {
            let path = self.output_dir.join(&page.file_name);
            if !claimed.insert(page.file_name.clone()) {
                warn!(path = %path.display(), tag = ?tag, "index file name already in use");
                failures.push(BuildFailure::new(
                    &path,
                    DocumentError::IndexCollision {
                        tag: tag.unwrap_or_default().to_string(),
                        file: page.file_name.clone(),
                    },
                ));
                continue;
            }

            let result = generator
                .generate_index(&page, &naming, tag, tags)
                .map_err(DocumentError::from)
                .and_then(|html| self.write_html(&path, html));

            match result {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to write index page");
                    failures.push(BuildFailure::new(path, e));
                }
            }
        }

        debug!(tag = ?tag, pages = written, "wrote index");
        written
    }

    fn write_html(&self, path: &Path, html: String) -> std::result::Result<(), DocumentError> {
        let bytes = if self.minify {
            output::minify(&html)
        } else {
            html.into_bytes()
        };
        output::write_atomic(path, &bytes)?;
        Ok(())
    }
}

fn has_favicon(source_dir: &Path) -> bool {
    output::FAVICON_CANDIDATES
        .iter()
        .any(|name| source_dir.join(name).is_file())
}

/// Source documents in `dir`, sorted by file name.
///
/// A missing directory is an error only when `required`.
pub fn list_documents(dir: &Path, required: bool) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "optional directory missing");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(BuildError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_document = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
        if is_document {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            site_name: "Test Site".to_string(),
            author: "Test Author".to_string(),
            url: "https://example.com".to_string(),
            ..SiteConfig::default()
        }
    }

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_build_minimal_site() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(
            source.path(),
            "articles/hello.html",
            "title: Hello\ndate: 2024-01-01\ntags: [Rust]\n---\n<h2>Intro</h2><p>Hi</p>",
        );

        let stats = Builder::new(test_config(), source.path(), output.path())
            .build()
            .unwrap();

        assert_eq!(stats.articles, 1);
        assert_eq!(stats.pages, 0);
        assert_eq!(stats.index_pages, 2);
        assert_eq!(stats.feed_items, 1);

        let out = output.path();
        let article = fs::read_to_string(out.join("articles/hello.html")).unwrap();
        assert!(article.contains(r##"<h2 id="intro">Intro<a class="h-a" href="#intro">#</a></h2>"##));
        assert!(out.join("index.html").exists());
        assert!(out.join("index-rust.html").exists());
        assert!(out.join("feed.xml").exists());
        assert!(out.join("base.css").exists());
        assert!(out.join("404.html").exists());
    }

    #[test]
    fn test_numeric_tag_keeps_main_index_pages() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(
            source.path(),
            "articles/alpha.html",
            "title: Alpha\ndate: 2024-02-01\ntags: [\"2\"]\n---\n<p>a</p>",
        );
        write(
            source.path(),
            "articles/beta.html",
            "title: Beta\ndate: 2024-01-01\n---\n<p>b</p>",
        );
        let config = SiteConfig {
            max_index_entries: 1,
            ..test_config()
        };

        let stats = Builder::new(config, source.path(), output.path())
            .build()
            .unwrap();

        assert_eq!(stats.index_pages, 3);
        let second = fs::read_to_string(output.path().join("index-2.html")).unwrap();
        assert!(second.contains("Beta"));
        assert!(!second.contains("Articles tagged"));
        let tagged = fs::read_to_string(output.path().join("index-_2.html")).unwrap();
        assert!(tagged.contains("Alpha"));
    }

    #[test]
    fn test_tags_with_path_characters_stay_in_output_root() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(
            source.path(),
            "articles/a.html",
            "title: A\ndate: 2024-01-01\ntags: [ci/cd, \"x/../../..\"]\n---\n<p>a</p>",
        );

        Builder::new(test_config(), source.path(), output.path())
            .build()
            .unwrap();

        let out = output.path();
        assert!(out.join("index-ci_cd.html").is_file());
        assert!(out.join("index-x_________.html").is_file());
        assert!(!out.join("index-ci").exists());
        assert!(!out.join("index-x").exists());

        write(
            source.path(),
            "articles/a.html",
            "title: A\ndate: 2024-01-01\n---\n<p>a</p>",
        );
        Builder::new(test_config(), source.path(), out)
            .build()
            .unwrap();
        assert!(!out.join("index-ci_cd.html").exists());
    }

    #[test]
    fn test_tags_sharing_a_file_name_fail_the_build() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(
            source.path(),
            "articles/a.html",
            "title: A\ndate: 2024-01-01\ntags: [ci-cd]\n---\n<p>a</p>",
        );
        write(
            source.path(),
            "articles/b.html",
            "title: B\ndate: 2024-01-02\ntags: [ci/cd]\n---\n<p>b</p>",
        );

        let err = Builder::new(test_config(), source.path(), output.path())
            .build()
            .unwrap_err();

        let BuildError::Incomplete { failures } = err else {
            panic!("expected an incomplete build");
        };
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0].source,
            DocumentError::IndexCollision { tag, file } if tag == "ci/cd" && file == "index-ci_cd.html"
        ));
        let kept = fs::read_to_string(output.path().join("index-ci_cd.html")).unwrap();
        assert!(kept.contains("articles/a.html"));
        assert!(!kept.contains("articles/b.html"));
    }

    #[test]
    fn test_missing_articles_dir_is_fatal() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(output.path().join("index.html"), "old").unwrap();

        let err = Builder::new(test_config(), source.path(), output.path())
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::Io { .. }));
        assert!(output.path().join("index.html").exists());
    }

    #[test]
    fn test_failures_accumulate() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(source.path(), "articles/good.html", "title: Good\n---\n<p>ok</p>");
        write(source.path(), "articles/no-header.html", "<p>no header</p>");
        write(
            source.path(),
            "articles/bad-img.html",
            "title: Bad\n---\n<img src=\"a.png\" loading=\"lazy\">",
        );

        let err = Builder::new(test_config(), source.path(), output.path())
            .build()
            .unwrap_err();

        let BuildError::Incomplete { failures } = err else {
            panic!("expected an incomplete build");
        };
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures.iter().find(|f| f.path.ends_with("no-header.html")).map(|f| &f.source), Some(DocumentError::Header(_))));
        assert!(matches!(failures.iter().find(|f| f.path.ends_with("bad-img.html")).map(|f| &f.source), Some(DocumentError::Transform(_))));
        assert!(output.path().join("articles/good.html").exists());
        assert!(output.path().join("index.html").exists());
    }

    #[test]
    fn test_drafts_and_ignored_files() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(source.path(), "articles/draft.html", "title: Draft\ndraft: true\n---\n<p>x</p>");
        write(source.path(), "articles/notes.html-draft", "not a document");
        write(source.path(), "articles/post.html", "title: Post\n---\n<p>x</p>");

        let stats = Builder::new(test_config(), source.path(), output.path())
            .build()
            .unwrap();
        assert_eq!(stats.articles, 1);
        assert!(!output.path().join("articles/draft.html").exists());

        let stats = Builder::new(test_config(), source.path(), output.path())
            .include_drafts(true)
            .build()
            .unwrap();
        assert_eq!(stats.articles, 2);
        assert!(output.path().join("articles/draft.html").exists());
    }

    #[test]
    fn test_custom_pages_in_nav() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(source.path(), "articles/a.html", "title: A\n---\n<p>a</p>");
        write(source.path(), "pages/about.html", "title: About me\n---\n<p>me</p>");
        write(source.path(), "pages/secret.html", "title: Secret\nhidden: true\n---\n<p>s</p>");

        let stats = Builder::new(test_config(), source.path(), output.path())
            .build()
            .unwrap();
        assert_eq!(stats.pages, 2);

        let index = fs::read_to_string(output.path().join("index.html")).unwrap();
        assert!(index.contains(r#"<a href="/pages/about.html">About me</a>"#));
        assert!(!index.contains("Secret"));
        assert!(output.path().join("pages/secret.html").exists());
    }

    #[test]
    fn test_minified_output() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(source.path(), "articles/a.html", "title: A\n---\n<p>a</p>");

        Builder::new(test_config(), source.path(), output.path())
            .minify(true)
            .build()
            .unwrap();

        let html = fs::read_to_string(output.path().join("articles/a.html")).unwrap();
        assert!(!html.contains("\n    <meta"));
        assert!(html.contains("<p>a</p>"));
    }

    #[test]
    fn test_check_reports_without_writing() {
        let source = TempDir::new().unwrap();
        write(source.path(), "articles/ok.html", "title: Ok\ndate: 2024-01-01\n---\n<p>x</p>");
        write(source.path(), "articles/bad.html", "title: Bad\ndate: 01/02/2024\n---\n<p>x</p>");
        write(
            source.path(),
            "articles/pod.html",
            "title: Pod\ndate: 2024-01-01\npodcast-audio: media/missing.mp3\n---\n<p>x</p>",
        );
        write(source.path(), "articles/undated.html", "title: Undated\n---\n<p>x</p>");

        let output = source.path().join("out");
        let report = Builder::new(test_config(), source.path(), &output)
            .check()
            .unwrap();

        assert_eq!(report.documents, 4);
        assert_eq!(report.errors.len(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("undated.html")));
        assert!(report.warnings.iter().any(|w| w.contains("favicon")));
        assert!(!output.exists());
    }

    #[test]
    fn test_list_documents() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.html", "");
        write(dir.path(), "a.html", "");
        write(dir.path(), "c.txt", "");

        let files = list_documents(dir.path(), true).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.html", "b.html"]);

        assert!(list_documents(&dir.path().join("missing"), false).unwrap().is_empty());
        assert!(list_documents(&dir.path().join("missing"), true).is_err());
    }
}
