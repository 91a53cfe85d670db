//! Document header parsing.
//!
//! Every article and page starts with a YAML header, followed by a line
//! containing only `---`, followed by the HTML body:
//!
//! ```text
//! title: Hello
//! date: 2024-01-02
//! tags: [rust, web]
//! ---
//! <p>Body</p>
//! ```

use std::{fmt, path::Path, path::PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Line separating the header from the body, after newline normalization.
pub const SEPARATOR: &str = "\n---\n";

const SEPARATOR_LINE: &str = "---";

/// Date layout accepted in the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Header parsing errors.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The document could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document does not contain exactly one separator line.
    #[error("{}", malformed_message(*separators))]
    MalformedDocument { separators: usize },

    /// One or more header fields failed to decode.
    #[error("invalid header: {0}")]
    Fields(FieldErrors),
}

fn malformed_message(separators: usize) -> String {
    if separators == 0 {
        "header missing, separate it from the body with a `---` line".to_string()
    } else {
        format!("there must only be one header, found {separators} `---` separator lines")
    }
}

/// A single header field problem.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The header block or one of its fields has the wrong shape.
    #[error("{field}: {message}")]
    Decode { field: String, message: String },

    /// The `date` field is not a `YYYY-MM-DD` date.
    #[error("date '{value}': {source}")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Every field problem found in one header.
#[derive(Debug)]
pub struct FieldErrors(pub Vec<FieldError>);

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Result type for header parsing.
pub type Result<T> = std::result::Result<T, HeaderError>;

/// Decoded document header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    pub title: String,
    pub description: String,
    /// Raw `date` value as written.
    pub date: Option<String>,
    /// Publish date parsed from `date`.
    pub published: Option<NaiveDate>,
    pub tags: Vec<String>,
    /// Excluded from builds unless drafts are requested.
    pub draft: bool,
    /// Rendered, but never linked from indexes, navigation or the feed.
    pub hidden: bool,
    pub author: String,
    pub author_email: String,
    /// Source-relative path of a podcast audio file.
    pub podcast_audio: Option<String>,
}

/// A document split into its decoded header and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub header: DocumentHeader,
    pub body: String,
}

/// Read and parse a document from disk.
pub fn parse_file(path: &Path) -> Result<ParsedDocument> {
    let raw = std::fs::read(path).map_err(|source| HeaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&String::from_utf8_lossy(&raw))
}

/// Split a raw document at its separator line and decode the header.
pub fn parse_document(raw: &str) -> Result<ParsedDocument> {
    let normalized = raw.replace("\r\n", "\n");

    let (header, body) = match separator_offsets(&normalized).as_slice() {
        [at] => {
            let body = &normalized[at + SEPARATOR_LINE.len()..];
            (&normalized[..at - 1], body.strip_prefix('\n').unwrap_or(body))
        }
        offsets => {
            return Err(HeaderError::MalformedDocument {
                separators: offsets.len(),
            });
        }
    };

    let header = decode_header(header)?;
    Ok(ParsedDocument {
        header,
        body: body.to_string(),
    })
}

/// Byte offsets of every separator line after the first line.
fn separator_offsets(normalized: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut start = 0;
    for line in normalized.split_inclusive('\n') {
        let text = line.strip_suffix('\n').unwrap_or(line);
        if start > 0 && text == SEPARATOR_LINE {
            offsets.push(start);
        }
        start += line.len();
    }
    offsets
}

/// Decode the YAML header block, collecting every field error.
pub fn decode_header(block: &str) -> Result<DocumentHeader> {
    let value: Value = serde_yaml::from_str(block).map_err(|e| {
        HeaderError::Fields(FieldErrors(vec![FieldError::Decode {
            field: "header".to_string(),
            message: e.to_string(),
        }]))
    })?;

    let map = match value {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => {
            return Err(HeaderError::Fields(FieldErrors(vec![FieldError::Decode {
                field: "header".to_string(),
                message: "expected a mapping of fields".to_string(),
            }])));
        }
    };

    let mut errors = Vec::new();
    let mut header = DocumentHeader {
        title: field(&map, "title", &mut errors),
        description: field(&map, "description", &mut errors),
        date: field(&map, "date", &mut errors),
        published: None,
        tags: field(&map, "tags", &mut errors),
        draft: field(&map, "draft", &mut errors),
        hidden: field(&map, "hidden", &mut errors),
        author: field(&map, "author", &mut errors),
        author_email: field(&map, "author-email", &mut errors),
        podcast_audio: field(&map, "podcast-audio", &mut errors),
    };

    header.date = header.date.filter(|d| !d.trim().is_empty());
    header.podcast_audio = header.podcast_audio.filter(|p| !p.trim().is_empty());

    if let Some(date) = &header.date {
        match NaiveDate::parse_from_str(date.trim(), DATE_FORMAT) {
            Ok(parsed) => header.published = Some(parsed),
            Err(source) => errors.push(FieldError::Date {
                value: date.clone(),
                source,
            }),
        }
    }

    if errors.is_empty() {
        Ok(header)
    } else {
        Err(HeaderError::Fields(FieldErrors(errors)))
    }
}

fn field<T: DeserializeOwned + Default>(
    map: &Mapping,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> T {
    match map.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_yaml::from_value(value.clone()).unwrap_or_else(|e| {
            errors.push(FieldError::Decode {
                field: key.to_string(),
                message: e.to_string(),
            });
            T::default()
        }),
    }
}
