//! End-to-end tests for blogsmith.
//!
//! These tests build small sites from scratch and inspect the generated tree.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use blogsmith_core::SiteConfig;
use blogsmith_generator::{Builder, transform::embed_id};
use tempfile::TempDir;
use walkdir::WalkDir;

fn config() -> SiteConfig {
    SiteConfig {
        site_name: "E2E Blog".to_string(),
        author: "Jane Doe".to_string(),
        url: "https://example.com/blog".to_string(),
        base_path: "/blog".to_string(),
        description: "Testing the whole pipeline".to_string(),
        email: "jane@example.com".to_string(),
        ..SiteConfig::default()
    }
}

fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn article(title: &str, date: &str, tags: &[&str], extra: &str, body: &str) -> String {
    format!(
        "title: {title}\ndate: {date}\ntags: [{}]\n{extra}---\n{body}",
        tags.join(", ")
    )
}

fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

fn sample_site() -> TempDir {
    let source = TempDir::new().unwrap();
    let root = source.path();

    write(
        root,
        "articles/first.html",
        article("First", "2024-01-01", &["Rust", "web"], "", "<h2>Setup</h2><p>One</p>"),
    );
    write(
        root,
        "articles/second.html",
        article(
            "Second",
            "2024-02-01",
            &["rust"],
            "podcast-audio: media/ep1.mp3\n",
            r#"<p>Two</p><asciicast src="/media/demo.cast"/>"#,
        ),
    );
    write(
        root,
        "articles/hidden.html",
        article("Hidden", "2024-03-01", &["secret"], "hidden: true\n", "<p>Shh</p>"),
    );
    write(
        root,
        "articles/draft.html",
        article("Draft", "2024-04-01", &["draft"], "draft: true\n", "<p>WIP</p>"),
    );
    write(root, "pages/about.html", "title: About\n---\n<p>Me</p>");
    write(root, "media/ep1.mp3", vec![7u8; 2048]);
    write(root, "media/demo.cast", "{}");
    write(root, "favicon.png", b"png");

    source
}

#[test]
fn test_full_site_layout() {
    let source = sample_site();
    let output = TempDir::new().unwrap();

    let stats = Builder::new(config(), source.path(), output.path())
        .build()
        .expect("build should succeed");

    assert_eq!(stats.articles, 3);
    assert_eq!(stats.pages, 1);
    assert_eq!(stats.feed_items, 2);
    assert_eq!(stats.media_files, 2);

    let out = output.path();
    for file in [
        "articles/first.html",
        "articles/second.html",
        "articles/hidden.html",
        "pages/about.html",
        "index.html",
        "index-rust.html",
        "index-web.html",
        "feed.xml",
        "base.css",
        "404.html",
        "favicon.png",
        "media/ep1.mp3",
    ] {
        assert!(out.join(file).exists(), "{file} should exist");
    }
    assert!(!out.join("articles/draft.html").exists());
    assert!(!out.join("index-secret.html").exists());
    assert!(!out.join("index-draft.html").exists());
}

#[test]
fn test_hidden_articles_stay_out_of_indexes_and_feed() {
    let source = sample_site();
    let output = TempDir::new().unwrap();
    Builder::new(config(), source.path(), output.path())
        .build()
        .unwrap();

    let index = fs::read_to_string(output.path().join("index.html")).unwrap();
    assert!(index.contains("/blog/articles/first.html"));
    assert!(index.contains("/blog/articles/second.html"));
    assert!(!index.contains("hidden.html"));
    assert!(index.find("second.html").unwrap() < index.find("first.html").unwrap());

    let feed = fs::read_to_string(output.path().join("feed.xml")).unwrap();
    assert!(feed.contains("<title>Second</title>"));
    assert!(!feed.contains("Hidden"));
}

#[test]
fn test_article_page_features() {
    let source = sample_site();
    let output = TempDir::new().unwrap();
    Builder::new(config(), source.path(), output.path())
        .build()
        .unwrap();

    let first = fs::read_to_string(output.path().join("articles/first.html")).unwrap();
    assert!(first.contains(r##"<h2 id="setup">Setup<a class="h-a" href="#setup">#</a></h2>"##));
    assert!(first.contains(r#"<a href="/blog/pages/about.html">About</a>"#));
    assert!(first.contains(r#"href="/blog/index-rust.html""#));
    assert!(first.contains(r#"<link rel="icon" href="/blog/favicon.png">"#));

    let second = fs::read_to_string(output.path().join("articles/second.html")).unwrap();
    let id = embed_id("/media/demo.cast");
    assert!(second.contains(&format!(r#"<div id="{id}"></div>"#)));
    assert!(second.contains("AsciinemaPlayer.create"));
    assert!(second.contains(r#"src="/blog/media/ep1.mp3""#));
}

#[test]
fn test_feed_enclosure_and_raw_content() {
    let source = sample_site();
    let output = TempDir::new().unwrap();
    Builder::new(config(), source.path(), output.path())
        .build()
        .unwrap();

    let feed = fs::read_to_string(output.path().join("feed.xml")).unwrap();
    assert!(feed.contains(r#"url="https://example.com/blog/media/ep1.mp3""#));
    assert!(feed.contains(r#"length="2048""#));
    assert!(feed.contains(r#"type="audio/mpeg""#));
    assert!(feed.contains("<managingEditor>jane@example.com (Jane Doe)</managingEditor>"));
    assert!(feed.contains("https://example.com/blog/articles/second.html"));
    // The feed carries the untransformed body.
    assert!(feed.contains("asciicast"));
}

#[test]
fn test_rebuild_is_byte_identical() {
    let source = sample_site();
    let output = TempDir::new().unwrap();
    let builder = Builder::new(config(), source.path(), output.path());

    builder.build().unwrap();
    let first = snapshot(output.path());
    builder.build().unwrap();
    let second = snapshot(output.path());

    assert_eq!(first.keys().collect::<Vec<_>>(), second.keys().collect::<Vec<_>>());
    assert!(first == second, "rebuild changed the output tree");
}

#[test]
fn test_twenty_five_articles_paginate_into_three_pages() {
    let source = TempDir::new().unwrap();
    for day in 1..=25 {
        write(
            source.path(),
            &format!("articles/post-{day:02}.html"),
            article(
                &format!("Post {day}"),
                &format!("2024-01-{day:02}"),
                &["all"],
                "",
                "<p>x</p>",
            ),
        );
    }
    let output = TempDir::new().unwrap();

    let stats = Builder::new(config(), source.path(), output.path())
        .build()
        .unwrap();
    assert_eq!(stats.index_pages, 6);

    let out = output.path();
    let count = |file: &str| {
        fs::read_to_string(out.join(file))
            .unwrap()
            .matches(r#"class="post-title""#)
            .count()
    };
    assert_eq!(count("index.html"), 10);
    assert_eq!(count("index-2.html"), 10);
    assert_eq!(count("index-3.html"), 5);
    assert!(!out.join("index-4.html").exists());
    assert_eq!(count("index-all-3.html"), 5);

    let page1 = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(page1.contains("Page 1 of 3"));
    assert!(page1.contains("Post 25"));
    assert!(!page1.contains(r#"rel="prev""#));

    let page3 = fs::read_to_string(out.join("index-3.html")).unwrap();
    assert!(page3.contains("Post 1<"));
    assert!(page3.contains(r#"<a href="/blog/index-2.html" rel="prev">"#));
    assert!(!page3.contains(r#"rel="next""#));
}

#[test]
fn test_cleanup_keeps_foreign_files_and_drops_stale_output() {
    let source = sample_site();
    let output = TempDir::new().unwrap();
    write(output.path(), "CNAME", "blog.example.com");
    write(output.path(), "articles/removed.html", "stale");
    write(output.path(), "index-9.html", "stale");

    Builder::new(config(), source.path(), output.path())
        .build()
        .unwrap();

    assert!(output.path().join("CNAME").exists());
    assert!(!output.path().join("articles/removed.html").exists());
    assert!(!output.path().join("index-9.html").exists());
}

#[test]
fn test_missing_podcast_asset_fails_feed_only() {
    let source = sample_site();
    fs::remove_file(source.path().join("media/ep1.mp3")).unwrap();
    let output = TempDir::new().unwrap();

    let err = Builder::new(config(), source.path(), output.path())
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("feed.xml"));
    assert!(output.path().join("articles/second.html").exists());
    assert!(output.path().join("index.html").exists());
    assert!(!output.path().join("feed.xml").exists());
}
