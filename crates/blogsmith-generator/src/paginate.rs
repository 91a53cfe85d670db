//! Index pagination.

use std::num::NonZeroUsize;

/// File naming scheme for one paginated index.
///
/// Page 1 has a fixed name; later pages append their number:
/// `index.html`, `index-2.html`, ... or `index-rust.html`, `index-rust-2.html`, ...
///
/// Tag stems never contain `-` and are never all digits, so a tag index can
/// not take the name of a numbered page of another index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNaming {
    stem: String,
}

impl PageNaming {
    /// Naming for the unfiltered index.
    #[must_use]
    pub fn main() -> Self {
        Self {
            stem: "index".to_string(),
        }
    }

    /// Naming for the index filtered by `tag`.
    #[must_use]
    pub fn for_tag(tag: &str) -> Self {
        Self {
            stem: format!("index-{}", tag_file_stem(tag)),
        }
    }

    /// File name of page `number` (1-based).
    #[must_use]
    pub fn file_name(&self, number: usize) -> String {
        if number <= 1 {
            format!("{}.html", self.stem)
        } else {
            format!("{}-{number}.html", self.stem)
        }
    }

    /// File name of the first page.
    #[must_use]
    pub fn first(&self) -> String {
        self.file_name(1)
    }
}

/// File-name-safe form of `tag`.
///
/// Alphanumerics and `_` are kept, every other character (path separators,
/// dots, dashes, spaces) becomes `_`. An all-digit or empty result gets a
/// leading `_`.
#[must_use]
pub fn tag_file_stem(tag: &str) -> String {
    let stem: String = tag
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if stem.chars().all(|c| c.is_ascii_digit()) {
        format!("_{stem}")
    } else {
        stem
    }
}

/// One page of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// 1-based page number.
    pub number: usize,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    /// Number of the last page.
    pub last: usize,
    pub file_name: String,
    pub first_page: String,
    pub items: &'a [T],
}

/// Slice out page `page` (1-based) and report the total page count.
pub fn slice_page<T>(items: &[T], page: usize, per_page: NonZeroUsize) -> (&[T], usize) {
    let per_page = per_page.get();
    let total_pages = items.len().div_ceil(per_page);
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(items.len());

    if start >= items.len() {
        (&[], total_pages)
    } else {
        (&items[start..end], total_pages)
    }
}

/// Split `items` into consecutive pages of at most `per_page` entries.
///
/// Empty input yields no pages.
pub fn paginate<'a, T>(
    items: &'a [T],
    per_page: NonZeroUsize,
    naming: &PageNaming,
) -> Vec<Page<'a, T>> {
    let last = items.len().div_ceil(per_page.get());

    (1..=last)
        .map(|number| {
            let (slice, _) = slice_page(items, number, per_page);
            Page {
                number,
                previous: (number > 1).then(|| number - 1),
                next: (number < last).then(|| number + 1),
                last,
                file_name: naming.file_name(number),
                first_page: naming.first(),
                items: slice,
            }
        })
        .collect()
}
