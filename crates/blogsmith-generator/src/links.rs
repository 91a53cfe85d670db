//! Absolute URL construction.
//!
//! URLs are always joined with forward slashes, independent of the host
//! platform's path separator.

use thiserror::Error;

/// URL construction errors.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The base is not an absolute `scheme://host[/path]` URL.
    #[error("'{url}' is not an absolute URL: {reason}")]
    InvalidUrl { url: String, reason: &'static str },
}

/// Join `part` onto the path of the absolute URL `base`.
///
/// The scheme and authority are kept, `.` and `..` segments are resolved and
/// duplicate slashes collapse. Query and fragment of `base` are preserved.
pub fn join_url(base: &str, part: &str) -> Result<String, LinkError> {
    let invalid = |reason| LinkError::InvalidUrl {
        url: base.to_string(),
        reason,
    };

    let (scheme, rest) = base.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
        return Err(invalid("invalid scheme"));
    }

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, rest) = rest.split_at(authority_end);
    if authority.is_empty() {
        return Err(invalid("missing host"));
    }
    if authority.chars().any(char::is_whitespace) {
        return Err(invalid("host contains whitespace"));
    }

    let path_end = rest.find(['?', '#']).unwrap_or(rest.len());
    let (path, suffix) = rest.split_at(path_end);

    let joined = clean_path(&format!("{path}/{part}"));
    Ok(format!("{scheme}://{authority}{joined}{suffix}"))
}

/// Normalize a slash-separated path to a rooted form without `.`/`..` segments.
#[must_use]
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}
