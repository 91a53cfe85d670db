//! Web rewriting of document bodies.
//!
//! A single pass over the quick-xml token stream, configured leniently so that
//! ordinary HTML (void elements, unquoted attributes, stray end tags) passes
//! through. Tokens are copied verbatim except for:
//!
//! - `h2`..`h6`: an `id` derived from the heading text plus a permalink anchor
//! - `img`: `loading="lazy"` validation and injection
//! - `<asciicast src="..."/>`: replaced by a placeholder `div`, recorded as an [`Embed`]
//! - `script`: the body is copied byte for byte without tokenizing

use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, Event},
};
use thiserror::Error;
use tracing::trace;

type XmlWriter = Writer<Vec<u8>>;

/// Content transformation errors.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Input ended inside an element that must be closed.
    #[error("unexpected end of input inside <{element}>")]
    TruncatedMarkup { element: String },

    /// A lazily loaded image without both dimensions.
    #[error("image tag '{tag}' is set to load lazy, but doesn't have a width and height")]
    InvalidImageMarkup { tag: String },

    /// A required attribute is missing or empty.
    #[error("<{element}> requires a non-empty '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// The tokenizer rejected the markup.
    #[error("malformed markup at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// Writing to the output buffer failed.
    #[error("failed to write transformed markup: {0}")]
    Write(#[from] std::io::Error),
}

/// Result type for transformations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// An embedded terminal recording found in a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Placeholder element id, derived from `src` only.
    pub id: String,
    pub src: String,
}

/// A body rewritten for the website.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformedBody {
    pub html: String,
    pub embeds: Vec<Embed>,
}

/// Rewrite a document body for the website.
pub fn transform_for_web(body: &str) -> Result<TransformedBody> {
    Transformer::new(body.as_bytes()).run()
}

/// Derive a heading id: lowercase, keep `[a-z0-9 ]`, spaces become `_`.
#[must_use]
pub fn element_id(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Placeholder id for an embed: 32-bit FNV-1 of `src` as lowercase hex.
#[must_use]
pub fn embed_id(src: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in src.as_bytes() {
        hash = hash.wrapping_mul(0x0100_0193);
        hash ^= u32::from(*byte);
    }
    format!("{hash:08x}")
}

fn create_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    let config = reader.config_mut();
    config.trim_text(false);
    config.enable_all_checks(false);
    config.allow_dangling_amp = true;
    config.allow_unmatched_ends = true;
    reader
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InHeading,
    /// The previous token opened a raw-text element (`script`, `style`);
    /// its body is copied unchanged up to the given close tag.
    VerbatimUntil(&'static [u8]),
}

/// Buffered heading contents while looking for the matching close tag.
struct HeadingScan {
    open: BytesStart<'static>,
    name: Vec<u8>,
    /// Nested elements with the same name as the heading.
    depth: usize,
    inner: XmlWriter,
    run: String,
    last_text: String,
}

impl HeadingScan {
    fn new(open: BytesStart<'static>, name: Vec<u8>) -> Self {
        Self {
            open,
            name,
            depth: 0,
            inner: Writer::new(Vec::new()),
            run: String::new(),
            last_text: String::new(),
        }
    }

    fn observe(&mut self, event: &Event<'_>) {
        match event {
            Event::Text(text) => self.run.push_str(&String::from_utf8_lossy(text)),
            Event::GeneralRef(entity) => {
                self.run.push('&');
                self.run.push_str(&String::from_utf8_lossy(entity));
                self.run.push(';');
            }
            _ => self.close_run(),
        }
    }

    fn close_run(&mut self) {
        let trimmed = self.run.trim();
        if !trimmed.is_empty() {
            self.last_text = trimmed.to_string();
        }
        self.run.clear();
    }
}

struct Transformer<'a> {
    input: &'a [u8],
    /// Position of the current reader's slice within `input`.
    offset: usize,
    reader: Reader<&'a [u8]>,
    out: XmlWriter,
    state: State,
    heading: Option<HeadingScan>,
    embeds: Vec<Embed>,
}

impl<'a> Transformer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            reader: create_reader(input),
            out: Writer::new(Vec::with_capacity(input.len() + 1024)),
            state: State::Normal,
            heading: None,
            embeds: Vec::new(),
        }
    }

    fn run(mut self) -> Result<TransformedBody> {
        loop {
            if let State::VerbatimUntil(close) = self.state {
                self.copy_raw_body(close)?;
                self.state = if self.heading.is_some() {
                    State::InHeading
                } else {
                    State::Normal
                };
                continue;
            }

            let event = self
                .reader
                .read_event()
                .map_err(|source| TransformError::Xml {
                    position: self.offset as u64 + self.reader.error_position(),
                    source,
                })?;

            match event {
                Event::Eof => return self.finish(),
                event => self.handle(event)?,
            }
        }
    }

    fn handle(&mut self, event: Event<'a>) -> Result<()> {
        match event {
            Event::Start(elem) => {
                let name = elem.name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"script" => {
                        self.emit(Event::Start(elem))?;
                        self.state = State::VerbatimUntil(b"</script");
                    }
                    b"style" => {
                        self.emit(Event::Start(elem))?;
                        self.state = State::VerbatimUntil(b"</style");
                    }
                    b"h2" | b"h3" | b"h4" | b"h5" | b"h6" if self.heading.is_none() => {
                        trace!(heading = %String::from_utf8_lossy(&name), "scanning heading");
                        self.heading = Some(HeadingScan::new(elem.into_owned(), name));
                        self.state = State::InHeading;
                    }
                    b"img" => {
                        let elem = rewrite_image(elem)?;
                        self.emit(Event::Start(elem))?;
                    }
                    _ => {
                        if let Some(scan) = self.heading.as_mut() {
                            if scan.name == name {
                                scan.depth += 1;
                            }
                        }
                        self.emit(Event::Start(elem))?;
                    }
                }
            }
            Event::Empty(elem) => {
                let name = elem.name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"img" => {
                        let elem = rewrite_image(elem)?;
                        self.emit(Event::Empty(elem))?;
                    }
                    b"asciicast" => {
                        let embed = asciicast_embed(&elem)?;
                        self.emit_raw(format!(r#"<div id="{}"></div>"#, embed.id).as_bytes())?;
                        self.embeds.push(embed);
                    }
                    _ => self.emit(Event::Empty(elem))?,
                }
            }
            Event::End(elem) => {
                let closes_heading = match self.heading.as_mut() {
                    Some(scan) if elem.name().as_ref().eq_ignore_ascii_case(&scan.name) => {
                        if scan.depth == 0 {
                            true
                        } else {
                            scan.depth -= 1;
                            false
                        }
                    }
                    _ => false,
                };

                match self.heading.take() {
                    Some(scan) if closes_heading => {
                        self.state = State::Normal;
                        self.write_heading(scan, elem)?;
                    }
                    scan => {
                        self.heading = scan;
                        self.emit(Event::End(elem))?;
                    }
                }
            }
            event => self.emit(event)?,
        }
        Ok(())
    }

    /// Write an event to the heading buffer when scanning, else to the output.
    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        match self.heading.as_mut() {
            Some(scan) => {
                scan.observe(&event);
                scan.inner.write_event(event)?;
            }
            None => self.out.write_event(event)?,
        }
        Ok(())
    }

    fn emit_raw(&mut self, bytes: &[u8]) -> Result<()> {
        use std::io::Write as _;

        match self.heading.as_mut() {
            Some(scan) => {
                scan.close_run();
                scan.inner.get_mut().write_all(bytes)?;
            }
            None => self.out.get_mut().write_all(bytes)?,
        }
        Ok(())
    }

    /// Copy everything up to the next `close` tag and resume tokenizing there.
    fn copy_raw_body(&mut self, close: &[u8]) -> Result<()> {
        let position = self.offset + self.reader.buffer_position() as usize;
        let rest = &self.input[position..];
        let end = find_ignore_ascii_case(rest, close).unwrap_or(rest.len());

        self.emit_raw(&rest[..end])?;
        self.offset = position + end;
        self.reader = create_reader(&self.input[self.offset..]);
        Ok(())
    }

    fn write_heading(&mut self, mut scan: HeadingScan, end: BytesEnd<'_>) -> Result<()> {
        use std::io::Write as _;

        scan.close_run();
        let existing_id = attribute_value(&scan.open, b"id");
        let id = existing_id
            .clone()
            .unwrap_or_else(|| element_id(&scan.last_text));
        let inner = scan.inner.into_inner();

        if scan.last_text.is_empty() || id.is_empty() {
            self.out.write_event(Event::Start(scan.open))?;
            self.out.get_mut().write_all(&inner)?;
            self.out.write_event(Event::End(end))?;
            return Ok(());
        }

        let open = if existing_id.is_some() {
            scan.open
        } else {
            with_attribute(&scan.open, "id", &id)
        };
        self.out.write_event(Event::Start(open))?;
        self.out.get_mut().write_all(&inner)?;
        write!(
            self.out.get_mut(),
            r##"<a class="h-a" href="#{id}">#</a>"##
        )?;
        self.out.write_event(Event::End(end))?;
        Ok(())
    }

    fn finish(self) -> Result<TransformedBody> {
        if let Some(scan) = &self.heading {
            return Err(TransformError::TruncatedMarkup {
                element: String::from_utf8_lossy(&scan.name).into_owned(),
            });
        }

        Ok(TransformedBody {
            html: String::from_utf8_lossy(&self.out.into_inner()).into_owned(),
            embeds: self.embeds,
        })
    }
}

fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

fn attribute_value(elem: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    elem.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(key))
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Append an attribute, keeping the original attribute text intact.
fn with_attribute(elem: &BytesStart<'_>, key: &str, value: &str) -> BytesStart<'static> {
    let name_len = elem.name().as_ref().len();
    let raw: &[u8] = elem;
    let content = String::from_utf8_lossy(raw.trim_ascii_end()).into_owned();
    let mut rebuilt = BytesStart::from_content(content, name_len);
    rebuilt.push_attribute((key, value));
    rebuilt
}

fn rewrite_image(elem: BytesStart<'_>) -> Result<BytesStart<'_>> {
    let mut has_width = false;
    let mut has_height = false;
    let mut loading: Option<String> = None;

    for attr in elem.html_attributes().flatten() {
        match attr.key.as_ref().to_ascii_lowercase().as_slice() {
            b"width" => has_width = true,
            b"height" => has_height = true,
            b"loading" => loading = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            _ => {}
        }
    }

    match loading.as_deref() {
        Some(value) if value.eq_ignore_ascii_case("lazy") && !(has_width && has_height) => {
            Err(TransformError::InvalidImageMarkup {
                tag: format!("<{}>", String::from_utf8_lossy(&elem)),
            })
        }
        None if has_width && has_height => Ok(with_attribute(&elem, "loading", "lazy")),
        _ => Ok(elem),
    }
}

fn asciicast_embed(elem: &BytesStart<'_>) -> Result<Embed> {
    let src = attribute_value(elem, b"src").unwrap_or_default();
    if src.trim().is_empty() {
        return Err(TransformError::MissingAttribute {
            element: "asciicast",
            attribute: "src",
        });
    }

    Ok(Embed {
        id: embed_id(&src),
        src,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web(body: &str) -> String {
        transform_for_web(body).unwrap().html
    }

    #[test]
    fn test_element_id() {
        assert_eq!(element_id("Hello, World!"), "hello_world");
        assert_eq!(element_id("Step 2: Profit"), "step_2_profit");
        assert_eq!(element_id("Ünïcode"), "ncode");
    }

    #[test]
    fn test_heading_gets_id_and_anchor() {
        assert_eq!(
            web("<h2>Hello, World!</h2>"),
            r##"<h2 id="hello_world">Hello, World!<a class="h-a" href="#hello_world">#</a></h2>"##
        );
    }

    #[test]
    fn test_heading_keeps_attributes() {
        assert_eq!(
            web(r#"<h3 class="big">Intro</h3>"#),
            r##"<h3 class="big" id="intro">Intro<a class="h-a" href="#intro">#</a></h3>"##
        );
    }

    #[test]
    fn test_heading_existing_id_is_kept() {
        assert_eq!(
            web(r#"<h4 id="custom">Some Title</h4>"#),
            r##"<h4 id="custom">Some Title<a class="h-a" href="#custom">#</a></h4>"##
        );
    }

    #[test]
    fn test_heading_uses_last_text_run() {
        let html = web("<h2>Using <code>cargo</code> well</h2>");
        assert!(html.starts_with(r#"<h2 id="well">Using <code>cargo</code> well"#));
        assert!(html.ends_with(r##"<a class="h-a" href="#well">#</a></h2>"##));

        let html = web("<h2><code>cargo</code>\n</h2>");
        assert!(html.starts_with(r#"<h2 id="cargo">"#));
    }

    #[test]
    fn test_heading_entities_stay_escaped() {
        assert_eq!(
            web("<h2>Q&amp;A</h2>"),
            r##"<h2 id="qampa">Q&amp;A<a class="h-a" href="#qampa">#</a></h2>"##
        );
    }

    #[test]
    fn test_empty_heading_unchanged() {
        assert_eq!(web("<h2></h2><h5><img src=a.png></h5>"), "<h2></h2><h5><img src=a.png></h5>");
    }

    #[test]
    fn test_h1_untouched() {
        assert_eq!(web("<h1>Title</h1>"), "<h1>Title</h1>");
    }

    #[test]
    fn test_truncated_heading() {
        let err = transform_for_web("<p>ok</p><h2>Never closed").unwrap_err();
        assert!(matches!(err, TransformError::TruncatedMarkup { ref element } if element == "h2"));
    }

    #[test]
    fn test_script_is_verbatim() {
        let body = r#"<script>if (a < b && c) { el.innerHTML = "<h2>x</h2>"; }</script><h2>After</h2>"#;
        let html = web(body);
        assert!(html.starts_with(
            r#"<script>if (a < b && c) { el.innerHTML = "<h2>x</h2>"; }</script>"#
        ));
        assert!(html.ends_with(r##"<h2 id="after">After<a class="h-a" href="#after">#</a></h2>"##));
    }

    #[test]
    fn test_script_close_tag_case_insensitive() {
        let body = "<SCRIPT type=module>let x = 1 < 2;</SCRIPT><p>tail</p>";
        assert_eq!(web(body), "<SCRIPT type=module>let x = 1 < 2;</SCRIPT><p>tail</p>");
    }

    #[test]
    fn test_style_is_verbatim() {
        let body = "<style>p > a { content: '<'; }</style><h3>Styled</h3>";
        let html = web(body);
        assert!(html.starts_with("<style>p > a { content: '<'; }</style>"));
        assert!(html.ends_with(r##"<h3 id="styled">Styled<a class="h-a" href="#styled">#</a></h3>"##));
    }

    #[test]
    fn test_unterminated_script_copied() {
        assert_eq!(web("<script>let a = 1 < 2;"), "<script>let a = 1 < 2;");
    }

    #[test]
    fn test_lazy_image_without_dimensions_fails() {
        let err = transform_for_web(r#"<img src="a.png" loading="lazy">"#).unwrap_err();
        assert!(matches!(err, TransformError::InvalidImageMarkup { .. }));

        let err = transform_for_web(r#"<img src="a.png" width="10" loading="lazy"/>"#).unwrap_err();
        assert!(matches!(err, TransformError::InvalidImageMarkup { .. }));
    }

    #[test]
    fn test_image_with_dimensions_gets_lazy() {
        assert_eq!(
            web(r#"<img src="a.png" width="10" height="20">"#),
            r#"<img src="a.png" width="10" height="20" loading="lazy">"#
        );
        assert_eq!(
            web(r#"<img src="a.png" width="10" height="20" />"#),
            r#"<img src="a.png" width="10" height="20" loading="lazy"/>"#
        );
    }

    #[test]
    fn test_explicit_loading_untouched() {
        let body = r#"<img src="a.png" width="10" height="20" loading="eager">"#;
        assert_eq!(web(body), body);

        let body = r#"<img src="a.png" width="10" height="20" loading="lazy">"#;
        assert_eq!(web(body), body);
    }

    #[test]
    fn test_image_without_dimensions_untouched() {
        let body = r#"<img src="a.png" alt="x">"#;
        assert_eq!(web(body), body);
    }

    #[test]
    fn test_asciicast_placeholder() {
        let body = transform_for_web(r#"<p>demo</p><asciicast src="/media/demo.cast"/>"#).unwrap();
        let id = embed_id("/media/demo.cast");

        assert_eq!(body.html, format!(r#"<p>demo</p><div id="{id}"></div>"#));
        assert_eq!(
            body.embeds,
            vec![Embed {
                id,
                src: "/media/demo.cast".to_string()
            }]
        );
    }

    #[test]
    fn test_asciicast_missing_src() {
        for body in ["<asciicast/>", r#"<asciicast src=""/>"#] {
            let err = transform_for_web(body).unwrap_err();
            assert!(matches!(
                err,
                TransformError::MissingAttribute {
                    element: "asciicast",
                    attribute: "src"
                }
            ));
        }
    }

    #[test]
    fn test_embed_id_is_fnv1() {
        assert_eq!(embed_id(""), "811c9dc5");
        assert_eq!(embed_id("a"), "050c5d7e");
        assert_eq!(embed_id("media/x.cast"), embed_id("media/x.cast"));

        let ids: std::collections::HashSet<_> = (0..100)
            .map(|i| embed_id(&format!("media/cast-{i}.cast")))
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_other_markup_passes_through() {
        let body = "<p class=lead>Text &amp; more</p><!-- note --><br><ul><li>a</li></ul>\n";
        assert_eq!(web(body), body);
    }

    #[test]
    fn test_stray_end_tag_passes_through() {
        assert_eq!(web("<p>a</p></div>"), "<p>a</p></div>");
    }
}
