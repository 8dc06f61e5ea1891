//! Heading-ID normalization and table-of-contents extraction.
//!
//! Both operate on rendered HTML, so they see headings from every source:
//! Markdown, raw markup in the body, and expanded includes.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

static BARE_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(h[1-6])>(.*?)</h[1-6]>").expect("valid heading regex"));
static ID_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(h[1-6]) id="([^"]*)"([^>]*)>(.*?)</h[1-6]>"#).expect("valid heading regex")
});
static ANY_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h([1-6])([^>]*)>(.*?)</h[1-6]>").expect("valid heading regex"));
static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id="([^"]*)""#).expect("valid id regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));

/// One entry in the table of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// The heading's anchor id.
    pub id: String,
    /// The heading's text content, tags stripped.
    pub content: String,
    /// Nested entries, in document order.
    pub children: Vec<TocEntry>,
}

/// Slug a heading's text the way GitHub anchors do: lowercase, runs of
/// non-word characters collapsed to hyphens.
///
/// Slugging its own output is a fixed point, so re-normalizing an already
/// normalized document changes nothing. Duplicate heading text yields
/// duplicate slugs; no disambiguation counter is applied.
#[must_use]
pub fn slugify(text: &str) -> String {
    NON_WORD_RE.replace_all(&text.to_lowercase(), "-").into_owned()
}

/// Give every heading a normalized id.
///
/// Headings without an id get one slugged from their text content;
/// headings that already carry an id have it re-slugged through the same
/// rule, so every heading id in the output is lowercase-hyphenated.
#[must_use]
pub fn normalize_heading_ids(html: &str) -> String {
    let assigned = BARE_HEADING_RE.replace_all(html, |caps: &Captures<'_>| {
        let title = &caps[2];
        let id = slugify(&strip_tags(title));
        format!(r#"<{tag} id="{id}">{title}</{tag}>"#, tag = &caps[1])
    });
    ID_HEADING_RE
        .replace_all(&assigned, |caps: &Captures<'_>| {
            format!(
                r#"<{tag} id="{id}"{rest}>{title}</{tag}>"#,
                tag = &caps[1],
                id = slugify(&caps[2]),
                rest = &caps[3],
                title = &caps[4]
            )
        })
        .into_owned()
}

/// Build the table of contents from rendered, id-normalized HTML.
///
/// Nesting is positional: an `h1` starts a root entry, an `h2` attaches to
/// the most recently seen `h1`, and each deeper level attaches to the most
/// recently seen heading one level up. Levels beyond `heading_level` are
/// left out entirely, and a heading with no eligible parent is dropped.
#[must_use]
pub fn build_toc(html: &str, heading_level: u8) -> Vec<TocEntry> {
    struct Node {
        entry: TocEntry,
        children: Vec<usize>,
    }

    let mut nodes: Vec<Node> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    // Most recently seen node per heading level (1-6)
    let mut last: [Option<usize>; 7] = [None; 7];

    for caps in ANY_HEADING_RE.captures_iter(html) {
        let level = caps[1].parse::<u8>().unwrap_or(1);
        if level > 1 && level > heading_level.max(2) {
            continue;
        }
        let level = usize::from(level);
        let id = ID_ATTR_RE
            .captures(&caps[2])
            .map(|id_caps| id_caps[1].to_owned())
            .unwrap_or_default();
        let entry = TocEntry {
            id,
            content: strip_tags(&caps[3]),
            children: Vec::new(),
        };
        let idx = nodes.len();
        nodes.push(Node {
            entry,
            children: Vec::new(),
        });

        if level == 1 {
            roots.push(idx);
        } else if let Some(parent) = last[level - 1] {
            nodes[parent].children.push(idx);
        }
        last[level] = Some(idx);
    }

    fn assemble(nodes: &[Node], idx: usize) -> TocEntry {
        let mut entry = nodes[idx].entry.clone();
        entry.children = nodes[idx]
            .children
            .iter()
            .map(|&child| assemble(nodes, child))
            .collect();
        entry
    }

    roots.iter().map(|&root| assemble(&nodes, root)).collect()
}

/// Text content of an HTML fragment: tags removed, basic entities decoded.
fn strip_tags(html: &str) -> String {
    TAG_RE
        .replace_all(html, "")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello"), "hello");
        assert_eq!(slugify("Getting Started"), "getting-started");
    }

    #[test]
    fn test_slugify_collapses_non_word_runs() {
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let once = slugify("Getting Started!");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn test_normalize_assigns_missing_ids() {
        let html = "<h1>Hello</h1>\n<h2>Getting Started</h2>";
        assert_eq!(
            normalize_heading_ids(html),
            "<h1 id=\"hello\">Hello</h1>\n<h2 id=\"getting-started\">Getting Started</h2>"
        );
    }

    #[test]
    fn test_normalize_reslugs_existing_ids() {
        let html = r#"<h2 id="Mixed Case ID">Title</h2>"#;
        assert_eq!(
            normalize_heading_ids(html),
            r#"<h2 id="mixed-case-id">Title</h2>"#
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let html = "<h1>One</h1><h2 id=\"TWO\">Two</h2><h3>A &amp; B</h3>";
        let once = normalize_heading_ids(html);
        assert_eq!(normalize_heading_ids(&once), once);
    }

    #[test]
    fn test_normalize_strips_tags_from_slug_source() {
        let html = "<h2>Install <code>cargo</code></h2>";
        assert_eq!(
            normalize_heading_ids(html),
            r#"<h2 id="install-cargo">Install <code>cargo</code></h2>"#
        );
    }

    #[test]
    fn test_duplicate_headings_keep_duplicate_ids() {
        let html = "<h2>FAQ</h2><h2>FAQ</h2>";
        let out = normalize_heading_ids(html);
        assert_eq!(out.matches(r#"id="faq""#).count(), 2);
    }

    #[test]
    fn test_normalize_preserves_other_attributes() {
        let html = r#"<h2 id="Setup" class="special">Setup</h2>"#;
        assert_eq!(
            normalize_heading_ids(html),
            r#"<h2 id="setup" class="special">Setup</h2>"#
        );
    }

    #[test]
    fn test_toc_single_root() {
        let html = r#"<h1 id="hello">Hello</h1><p>body</p>"#;
        let toc = build_toc(html, 2);
        assert_eq!(
            toc,
            vec![TocEntry {
                id: "hello".to_owned(),
                content: "Hello".to_owned(),
                children: vec![],
            }]
        );
    }

    #[test]
    fn test_toc_nests_h2_under_h1() {
        let html = r#"<h1 id="a">A</h1><h2 id="b">B</h2><h2 id="c">C</h2>"#;
        let toc = build_toc(html, 2);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].children.len(), 2);
        assert_eq!(toc[0].children[0].id, "b");
        assert_eq!(toc[0].children[1].id, "c");
    }

    #[test]
    fn test_toc_depth_gated_by_heading_level() {
        let html = r#"<h1 id="a">A</h1><h2 id="b">B</h2><h3 id="c">C</h3>"#;

        let shallow = build_toc(html, 2);
        assert!(shallow[0].children[0].children.is_empty());

        let deep = build_toc(html, 3);
        assert_eq!(deep[0].children[0].children.len(), 1);
        assert_eq!(deep[0].children[0].children[0].id, "c");
    }

    #[test]
    fn test_toc_orphan_heading_is_dropped() {
        // h2 before any h1 has no parent to attach to
        let html = r#"<h2 id="early">Early</h2><h1 id="root">Root</h1>"#;
        let toc = build_toc(html, 2);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].id, "root");
        assert!(toc[0].children.is_empty());
    }

    #[test]
    fn test_toc_attaches_to_most_recent_parent() {
        let html = concat!(
            r#"<h1 id="one">One</h1><h2 id="one-a">One A</h2>"#,
            r#"<h1 id="two">Two</h1><h2 id="two-a">Two A</h2>"#
        );
        let toc = build_toc(html, 2);
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].children[0].id, "one-a");
        assert_eq!(toc[1].children[0].id, "two-a");
    }

    #[test]
    fn test_toc_content_strips_inline_tags() {
        let html = r#"<h1 id="install-cargo">Install <code>cargo</code></h1>"#;
        let toc = build_toc(html, 2);
        assert_eq!(toc[0].content, "Install cargo");
    }

    #[test]
    fn test_toc_serializes_to_json() {
        let toc = build_toc(r#"<h1 id="hi">Hi</h1>"#, 2);
        let json = serde_json::to_string(&toc).unwrap();
        assert_eq!(json, r#"[{"id":"hi","content":"Hi","children":[]}]"#);
    }
}
