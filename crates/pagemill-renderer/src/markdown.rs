//! Markdown → HTML rendering.
//!
//! Thin configuration of the `pulldown-cmark` capability: the event stream
//! is rewritten so fenced code blocks go through the [`Highlighter`] and, by
//! default, bare `http(s)://` URLs in prose become links. Everything else is
//! emitted by the stock HTML writer.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd, html};
use regex::Regex;

use crate::Highlighter;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("valid URL regex"));

/// Feature toggles for the Markdown capability.
#[derive(Clone, Copy, Debug)]
pub struct MarkdownOptions {
    /// Enable inline attribute syntax on headings (`# Title {#id}`).
    pub attributes: bool,
    /// Detect bare URLs in text and turn them into links.
    pub autolink: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            attributes: false,
            autolink: true,
        }
    }
}

/// Render Markdown to HTML.
pub fn render_markdown(text: &str, options: &MarkdownOptions, highlighter: &Highlighter) -> String {
    let mut parser_options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    if options.attributes {
        parser_options |= Options::ENABLE_HEADING_ATTRIBUTES;
    }

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut code: Option<(String, String)> = None;
    let mut link_depth = 0usize;

    for event in Parser::new_ext(text, parser_options) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let tag = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_owned(),
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some((tag, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((tag, body)) = code.take() {
                    events.push(Event::Html(highlighter.highlight(&tag, &body).into()));
                }
            }
            Event::Text(chunk) => {
                if let Some((_, body)) = code.as_mut() {
                    body.push_str(&chunk);
                } else if options.autolink && link_depth == 0 {
                    linkify(&chunk, &mut events);
                } else {
                    events.push(Event::Text(chunk));
                }
            }
            Event::Start(Tag::Link { .. }) => {
                link_depth += 1;
                events.push(event);
            }
            Event::End(TagEnd::Link) => {
                link_depth = link_depth.saturating_sub(1);
                events.push(event);
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(text.len() * 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Split a text chunk around bare URLs, emitting link events for each.
fn linkify<'a>(chunk: &str, events: &mut Vec<Event<'a>>) {
    let mut cursor = 0;
    for found in URL_RE.find_iter(chunk) {
        let url = found.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if url.is_empty() {
            continue;
        }
        if found.start() > cursor {
            events.push(Event::Text(chunk[cursor..found.start()].to_owned().into()));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.to_owned().into(),
            title: "".into(),
            id: "".into(),
        }));
        events.push(Event::Text(url.to_owned().into()));
        events.push(Event::End(TagEnd::Link));
        cursor = found.start() + url.len();
    }
    if cursor < chunk.len() {
        events.push(Event::Text(chunk[cursor..].to_owned().into()));
    }
}
