//! Output tree management.
//!
//! Cleans previously generated artifacts, prepares the directory layout and
//! writes files atomically through a temporary file in the destination
//! directory.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directories owned by the generator.
pub const GENERATED_DIRS: [&str; 3] = ["articles", "pages", "media"];

/// Single files owned by the generator, besides `index*.html`.
pub const GENERATED_FILES: [&str; 5] = [
    "favicon.ico",
    "favicon.png",
    "base.css",
    "404.html",
    "feed.xml",
];

/// Favicon candidates in order of preference.
pub const FAVICON_CANDIDATES: [&str; 2] = ["favicon.ico", "favicon.png"];

/// Output errors.
#[derive(Debug, Error)]
pub enum OutputError {
    /// A filesystem operation failed.
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking a directory tree failed.
    #[error("failed to walk '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

fn io_error<'a>(
    action: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> OutputError + 'a {
    move |source| OutputError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// Whether `name` is a generated index page (`index*.html`).
#[must_use]
pub fn is_index_file(name: &str) -> bool {
    name.starts_with("index") && name.ends_with(".html")
}

/// Delete everything a previous build generated, leaving other files alone.
pub fn cleanup(output_dir: &Path) -> Result<()> {
    if !output_dir.exists() {
        return Ok(());
    }

    for dir in GENERATED_DIRS {
        let path = output_dir.join(dir);
        match fs::remove_dir_all(&path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                return Err(io_error("remove directory", &path)(err));
            }
            _ => {}
        }
    }

    for file in GENERATED_FILES {
        remove_file_if_exists(&output_dir.join(file))?;
    }

    let entries = fs::read_dir(output_dir).map_err(io_error("read directory", output_dir))?;
    for entry in entries {
        let entry = entry.map_err(io_error("read directory", output_dir))?;
        let is_file = entry.file_type().is_ok_and(|t| t.is_file());
        if is_file && is_index_file(&entry.file_name().to_string_lossy()) {
            remove_file_if_exists(&entry.path())?;
        }
    }

    debug!(dir = %output_dir.display(), "cleaned generated output");
    Ok(())
}

fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            Err(io_error("remove file", path)(err))
        }
        _ => Ok(()),
    }
}

/// Create the output directory and the generated subdirectories.
pub fn prepare(output_dir: &Path) -> Result<()> {
    for dir in GENERATED_DIRS {
        let path = output_dir.join(dir);
        fs::create_dir_all(&path).map_err(io_error("create directory", &path))?;
    }
    Ok(())
}

/// Write `contents` to `path` via a temporary file renamed into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;

    let mut file = NamedTempFile::new_in(parent).map_err(io_error("create temporary file in", parent))?;
    file.write_all(contents).map_err(io_error("write", path))?;
    file.persist(path)
        .map_err(|err| io_error("move into place", path)(err.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Copy one file atomically.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    let parent = to.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;

    let mut source = fs::File::open(from).map_err(io_error("open", from))?;
    let mut file = NamedTempFile::new_in(parent).map_err(io_error("create temporary file in", parent))?;
    let bytes = io::copy(&mut source, &mut file).map_err(io_error("copy", from))?;
    file.persist(to)
        .map_err(|err| io_error("move into place", to)(err.error))?;

    Ok(bytes)
}

/// Recursively copy `from` into `to`; returns the number of files copied.
///
/// A missing source directory copies nothing.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        debug!(dir = %from.display(), "no directory to copy");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|source| OutputError::Walk {
            path: from.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_error("create directory", &target))?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    info!(from = %from.display(), files = copied, "copied directory");
    Ok(copied)
}

/// Copy the favicon, preferring `.ico` over `.png`.
///
/// Returns the file name that was copied, if any.
pub fn copy_favicon(source_dir: &Path, output_dir: &Path) -> Result<Option<&'static str>> {
    for name in FAVICON_CANDIDATES {
        let source = source_dir.join(name);
        if source.is_file() {
            copy_file(&source, &output_dir.join(name))?;
            return Ok(Some(name));
        }
    }
    Ok(None)
}

/// Minify a generated HTML page.
#[must_use]
pub fn minify(html: &str) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html.as_bytes(), &cfg)
}
