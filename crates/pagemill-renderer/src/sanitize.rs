//! Allow-list sanitization of the document body.
//!
//! The body is Markdown with embedded HTML, so filtering runs *before* the
//! Markdown render and has to leave Markdown syntax alone. Three sequences a
//! generic filter would mangle are swapped for private-use sentinel
//! characters around the filter pass: a block-quote marker at line start and
//! the `>=` / `<=` comparison operators. Fenced code segments keep their
//! content verbatim only when tagged `xml` (they hold markup meant for
//! display); every other segment goes through the filter.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;

/// Sentinel for a line-leading block-quote marker (`\n>`).
const QUOTE_SENTINEL: char = '\u{e000}';
/// Sentinel for `>=`.
const GE_SENTINEL: char = '\u{e001}';
/// Sentinel for `<=`.
const LE_SENTINEL: char = '\u{e002}';

/// Allow-list HTML filter for document bodies.
pub struct Sanitizer {
    filter: Option<Builder<'static>>,
}

impl Sanitizer {
    /// Create the sanitizer. With `enabled` false every [`clean`](Self::clean)
    /// call returns its input unchanged (the `unsafe` render option).
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            filter: enabled.then(build_filter),
        }
    }

    /// Filter disallowed markup out of `text`.
    ///
    /// Structural and inline-formatting tags pass through; scripts, styles
    /// and event-handler attributes are stripped. Block quotes, comparison
    /// operators and fenced code survive byte-for-byte.
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        let Some(filter) = &self.filter else {
            return text.to_owned();
        };
        if text.is_empty() {
            return String::new();
        }

        let guarded = text
            .replace("\n>", &format!("\n{QUOTE_SENTINEL}"))
            .replace(">=", &GE_SENTINEL.to_string())
            .replace("<=", &LE_SENTINEL.to_string());

        let filtered = guarded
            .split("```")
            .map(|segment| {
                if segment.starts_with("xml") {
                    segment.to_owned()
                } else {
                    filter.clean(segment).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("```");

        // The filter entity-escapes text outside attribute contexts; undo it
        // so already-valid markup and plain prose are not corrupted.
        filtered
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&gt;", ">")
            .replace("&lt;", "<")
            .replace(&format!("\n{QUOTE_SENTINEL}"), "\n>")
            .replace(GE_SENTINEL, ">=")
            .replace(LE_SENTINEL, "<=")
    }
}

/// Tags the filter lets through: a generic structural/inline set plus the
/// heading, image and semantic tags the page layouts rely on.
fn build_filter() -> Builder<'static> {
    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "article",
        "aside",
        "b",
        "blockquote",
        "br",
        "caption",
        "code",
        "details",
        "div",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "li",
        "link",
        "meta",
        "ol",
        "p",
        "pre",
        "strike",
        "strong",
        "summary",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]);

    let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
    tag_attributes.insert("a", HashSet::from(["href", "id", "name", "target", "class"]));
    tag_attributes.insert("img", HashSet::from(["src", "alt", "class"]));
    tag_attributes.insert("aside", HashSet::from(["class"]));
    tag_attributes.insert("abbr", HashSet::from(["title", "class"]));
    tag_attributes.insert("details", HashSet::from(["open", "class"]));
    tag_attributes.insert("div", HashSet::from(["class"]));
    tag_attributes.insert("meta", HashSet::from(["name", "content"]));
    tag_attributes.insert("link", HashSet::from(["rel", "href", "type", "sizes"]));
    for heading in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        tag_attributes.insert(heading, HashSet::from(["id"]));
    }

    let mut builder = Builder::default();
    builder.tags(tags);
    builder.generic_attributes(HashSet::new());
    builder.tag_attributes(tag_attributes);
    builder.link_rel(None);
    builder
}
