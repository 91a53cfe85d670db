//! Init command - scaffold a new site source directory

use std::{fs, path::Path};

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr, bail};

/// Run the init command.
///
/// Creates `dir` with a configuration file, a sample article, a sample page
/// and an empty media directory.
pub fn run(dir: &Path) -> Result<()> {
    tracing::info!(?dir, "Initializing site");

    if dir.exists() {
        bail!("{} already exists, refusing to overwrite it", dir.display());
    }

    let site_name = dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("My Blog")
        .to_string();

    for sub in ["articles", "pages", "media"] {
        fs::create_dir_all(dir.join(sub))
            .wrap_err_with(|| format!("Failed to create {}", dir.join(sub).display()))?;
    }

    let config = serde_json::json!({
        "SiteName": site_name,
        "Author": "",
        "URL": "https://example.com",
        "BasePath": "",
        "Description": "",
        "MaxIndexEntries": 10,
    });
    let config = serde_json::to_string_pretty(&config).wrap_err("Failed to encode configuration")?;

    let today = Utc::now().format("%Y-%m-%d");
    let files = [
        ("config.json", format!("{config}\n")),
        (
            "articles/hello-world.html",
            format!(
                "title: Hello, World!\ndate: {today}\ntags: [welcome]\ndescription: The first article\n---\n\
                 <h2>Welcome</h2>\n<p>Edit <code>articles/hello-world.html</code> to get started.</p>\n"
            ),
        ),
        (
            "pages/about.html",
            "title: About\n---\n<p>Tell readers who you are.</p>\n".to_string(),
        ),
    ];

    for (name, contents) in &files {
        let path = dir.join(name);
        fs::write(&path, contents).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        println!("  Created: {}", path.display());
    }

    println!();
    println!("  Run `blogsmith live --source {}` to preview it", dir.display());

    Ok(())
}
