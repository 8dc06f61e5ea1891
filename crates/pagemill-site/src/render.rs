//! The render pipeline, start to finish.

use std::path::PathBuf;
use std::sync::Arc;

use tera::Tera;
use tracing::debug;

use pagemill_renderer::{IncludeExpander, normalize_heading_ids, render_markdown};

use crate::context::{RenderContext, RenderOptions};
use crate::front_matter::{FrontMatter, split_document};
use crate::images::rewrite_image_sources;
use crate::{SiteError, helpers};

/// Name the layout template is registered under. Unsuffixed on purpose:
/// helper output is already HTML, so the engine's autoescaping stays off
/// and the layout controls its own escaping.
const LAYOUT_TEMPLATE: &str = "layout";

/// Render one authored document to a finished HTML page.
///
/// The stages run in a fixed order with no branching back: front-matter
/// split, include expansion, sanitization, Markdown rendering, heading-ID
/// normalization, template rendering. Asset references are resolved and
/// staged by the template helpers as the layout calls them.
pub fn render(input: &str, options: RenderOptions) -> Result<String, SiteError> {
    let ctx = Arc::new(RenderContext::new(options)?);

    let (header, body) = split_document(input);
    let front_matter = FrontMatter::parse(&header)?;

    let expander = IncludeExpander::new(ctx.src.root(), ctx.missing_files());
    let expanded = expander.expand(&body)?;
    let cleaned = ctx.sanitizer.clean(&expanded);
    let rendered = render_markdown(&cleaned, &ctx.markdown_options(), &ctx.highlighter);
    let normalized = normalize_heading_ids(&rendered);
    let content = rewrite_image_sources(&normalized, &ctx)?;
    debug!(bytes = content.len(), "content pipeline finished");

    let layout = find_layout(&ctx)?;
    let mut tera = Tera::default();
    tera.add_template_file(&layout, Some(LAYOUT_TEMPLATE))?;
    // `add_template_file` derives autoescaping from the layout file's `.html`
    // extension, which would double-escape helper output that is already HTML.
    // The layout controls its own escaping (see note above), so keep the
    // engine's autoescaping off regardless of the file suffix.
    tera.autoescape_on(vec![]);
    helpers::register(&mut tera, &ctx, front_matter.heading_level());

    let mut locals = tera::Context::new();
    locals.insert(
        "current_page",
        &serde_json::json!({ "data": front_matter.mapping() }),
    );
    locals.insert("page_content", &content);

    Ok(tera.render(LAYOUT_TEMPLATE, &locals)?)
}

/// The page layout: `layouts/layout.html` under the source root, falling
/// back to the built-in theme.
fn find_layout(ctx: &RenderContext) -> Result<PathBuf, SiteError> {
    for root in [&ctx.src, &ctx.internal] {
        let candidate = root.root().join("layouts").join("layout.html");
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(SiteError::MissingLayout(
        ctx.src.root().join("layouts").join("layout.html"),
    ))
}
