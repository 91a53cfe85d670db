//! HTML template system for page generation.
//!
//! A lightweight `{{ variable }}` interpolation engine. Inserted values are
//! never re-scanned, so article bodies containing braces render verbatim.

use std::collections::HashMap;

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Variables available to one render call.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A named template.
///
/// Variables are written `{{ name }}`; `{{ name? }}` renders as empty when
/// the variable is absent.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut result = self.content.clone();
        let mut pos = 0;

        while let Some(start) = result[pos..].find("{{") {
            let start = pos + start;
            let end = result[start..]
                .find("}}")
                .ok_or_else(|| TemplateError::InvalidSyntax("unclosed {{ delimiter".to_string()))?;
            let end = start + end + 2;

            let var_name = result[start + 2..end - 2].trim();
            let (var_name, optional) = match var_name.strip_suffix('?') {
                Some(stripped) => (stripped.trim(), true),
                None => (var_name, false),
            };

            let value = match context.get(var_name) {
                Some(v) => v.to_string(),
                None if optional => String::new(),
                None => return Err(TemplateError::MissingVariable(var_name.to_string())),
            };

            result.replace_range(start..end, &value);
            pos = start + value.len();
        }

        Ok(result)
    }
}

/// Registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a registry holding the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(Template::new("base", DEFAULT_BASE_TEMPLATE));
        self.register(Template::new("article", DEFAULT_ARTICLE_TEMPLATE));
        self.register(Template::new("page", DEFAULT_PAGE_TEMPLATE));
        self.register(Template::new("index", DEFAULT_INDEX_TEMPLATE));
        self.register(Template::new("404", DEFAULT_NOT_FOUND_TEMPLATE));
    }

    /// Register a template, replacing one with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render a named template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        template.render(context)
    }
}

/// Page shell shared by every generated HTML file.
pub const DEFAULT_BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <meta name="description" content="{{ description? }}">
    <meta name="author" content="{{ author? }}">
    {{ meta? }}
    {{ favicon? }}
    <link rel="stylesheet" href="{{ base_path }}/base.css">
    <link rel="alternate" type="application/rss+xml" title="{{ site_name }}" href="{{ base_path }}/feed.xml">
    {{ head_extra? }}
</head>
<body>
    <header>
        <div class="container">
            <nav>
                <a href="{{ base_path }}/index.html" class="site-title">{{ site_name }}</a>
                <div class="nav-links">
                    <a href="{{ base_path }}/index.html">Articles</a>
                    {{ nav? }}
                    <a href="{{ base_path }}/feed.xml">RSS</a>
                </div>
            </nav>
        </div>
    </header>
    <main>
        <div class="container">
            {{ content }}
        </div>
    </main>
    <footer>
        <div class="container">
            <p>{{ footer }}</p>
        </div>
    </footer>
    {{ scripts? }}
</body>
</html>"#;

/// Article body with byline, tags, optional audio player and comments.
pub const DEFAULT_ARTICLE_TEMPLATE: &str = r#"<article class="post">
    <header>
        <h1>{{ title }}</h1>
        {{ byline? }}
        {{ tags_html? }}
    </header>
    {{ audio? }}
    <div class="content">
        {{ content }}
    </div>
    {{ comments? }}
</article>"#;

/// Standalone custom page.
pub const DEFAULT_PAGE_TEMPLATE: &str = r#"<article class="page">
    <h1>{{ title }}</h1>
    <div class="content">
        {{ content }}
    </div>
</article>"#;

/// One page of the article index.
pub const DEFAULT_INDEX_TEMPLATE: &str = r#"<section class="post-list">
    <h1>{{ heading }}</h1>
    {{ tag_filter? }}
    <ul>
        {{ items }}
    </ul>
    {{ pagination? }}
</section>"#;

/// Body of `404.html`.
pub const DEFAULT_NOT_FOUND_TEMPLATE: &str = r#"<section class="not-found">
    <h1>Page not found</h1>
    <p>The page you were looking for does not exist.</p>
    <p><a href="{{ home_url }}">Back to the articles</a></p>
</section>"#;

/// Stylesheet written to `base.css` on every build.
pub const BASE_CSS: &str = r#":root {
    --color-primary: #3B82F6;
    --color-primary-hover: #2563EB;
    --color-bg: #F8FAFC;
    --color-bg-secondary: #FFFFFF;
    --color-text: #1E293B;
    --color-text-secondary: #475569;
    --color-text-muted: #64748B;
    --color-border: #E2E8F0;
    --color-code-bg: #F1F5F9;
    color-scheme: light dark;
}

@media (prefers-color-scheme: dark) {
    :root {
        --color-primary: #60A5FA;
        --color-primary-hover: #93C5FD;
        --color-bg: #0F172A;
        --color-bg-secondary: #1E293B;
        --color-text: #F1F5F9;
        --color-text-secondary: #CBD5E1;
        --color-text-muted: #94A3B8;
        --color-border: #334155;
        --color-code-bg: #1E293B;
    }
}

*, *::before, *::after { box-sizing: border-box; }
* { margin: 0; padding: 0; }

body {
    font-family: system-ui, -apple-system, sans-serif;
    line-height: 1.7;
    color: var(--color-text);
    background-color: var(--color-bg);
    min-height: 100vh;
    display: flex;
    flex-direction: column;
}

.container {
    width: 100%;
    max-width: 720px;
    margin: 0 auto;
    padding: 0 1.5rem;
}

header nav {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 1rem 0;
    border-bottom: 1px solid var(--color-border);
}

.site-title {
    font-size: 1.125rem;
    font-weight: 600;
    color: var(--color-text);
    text-decoration: none;
}

.nav-links { display: flex; gap: 1.5rem; }
.nav-links a { font-size: 0.875rem; color: var(--color-text-secondary); text-decoration: none; }
.nav-links a:hover { color: var(--color-primary); }

main { flex: 1; padding: 3rem 0; }

h1, h2, h3, h4, h5, h6 { font-weight: 600; line-height: 1.3; }
h1 { font-size: 2rem; margin-bottom: 1rem; }
h2 { font-size: 1.5rem; margin: 2rem 0 0.75rem; }
h3 { font-size: 1.25rem; margin: 1.5rem 0 0.5rem; }
p { margin-bottom: 1.25rem; }

a { color: var(--color-primary); text-decoration: none; }
a:hover { color: var(--color-primary-hover); text-decoration: underline; }

a.h-a {
    margin-left: 0.5rem;
    color: var(--color-text-muted);
    visibility: hidden;
}
h2:hover a.h-a, h3:hover a.h-a, h4:hover a.h-a, h5:hover a.h-a, h6:hover a.h-a {
    visibility: visible;
}

ul, ol { padding-left: 1.5rem; margin-bottom: 1.25rem; }

code {
    font-family: ui-monospace, Menlo, Consolas, monospace;
    font-size: 0.875em;
    background-color: var(--color-code-bg);
    padding: 0.125rem 0.375rem;
    border-radius: 0.25rem;
}

pre {
    background-color: var(--color-code-bg);
    padding: 1rem;
    border-radius: 0.5rem;
    overflow-x: auto;
    margin-bottom: 1.5rem;
}
pre code { background: none; padding: 0; }

blockquote {
    border-left: 3px solid var(--color-primary);
    padding-left: 1rem;
    margin: 1.5rem 0;
    color: var(--color-text-secondary);
}

img { max-width: 100%; height: auto; }
audio { width: 100%; margin-bottom: 1.5rem; }

article header { margin-bottom: 2rem; }
article time { display: block; font-size: 0.875rem; color: var(--color-text-muted); }

.tags { display: flex; flex-wrap: wrap; gap: 0.5rem; margin-top: 0.75rem; list-style: none; padding: 0; }
.tags a {
    padding: 0.25rem 0.75rem;
    font-size: 0.75rem;
    background-color: var(--color-code-bg);
    border-radius: 9999px;
}
.tags a.active { background-color: var(--color-primary); color: var(--color-bg); }

.post-list ul { list-style: none; padding: 0; }
.post-list li {
    display: flex;
    justify-content: space-between;
    align-items: baseline;
    gap: 1rem;
    padding: 1rem 0;
    border-bottom: 1px solid var(--color-border);
}
.post-list time { flex-shrink: 0; font-size: 0.8125rem; color: var(--color-text-muted); }

.pagination {
    display: flex;
    justify-content: center;
    gap: 1rem;
    margin-top: 2rem;
    font-size: 0.875rem;
}

footer { border-top: 1px solid var(--color-border); padding: 2rem 0; }
footer p { font-size: 0.875rem; color: var(--color-text-muted); text-align: center; margin: 0; }

@media (max-width: 640px) {
    .container { padding: 0 1rem; }
    main { padding: 2rem 0; }
    .post-list li { flex-direction: column; gap: 0.25rem; }
}
"#;
