//! Content pipeline for the Pagemill renderer.
//!
//! The stages, in the order the orchestrator applies them:
//!
//! 1. [`IncludeExpander`]: splice `include::file[]` / `!INCLUDE file`
//!    directives into the raw body
//! 2. [`Sanitizer`]: allow-list filtering of embedded markup, with guards
//!    for Markdown syntax that merely looks like HTML
//! 3. [`render_markdown`]: Markdown → HTML with syntax-highlighted code
//!    blocks ([`Highlighter`]) and optional bare-URL autolinking
//! 4. [`normalize_heading_ids`]: GitHub-style slug ids on every heading
//! 5. [`build_toc`]: nested outline of the final document's headings

mod headings;
mod highlight;
mod include;
mod markdown;
mod sanitize;
mod util;

use std::path::PathBuf;

pub use headings::{TocEntry, build_toc, normalize_heading_ids, slugify};
pub use highlight::Highlighter;
pub use include::IncludeExpander;
pub use markdown::{MarkdownOptions, render_markdown};
pub use sanitize::Sanitizer;
pub use util::escape_html;

/// How an unresolvable include or asset is treated.
///
/// One policy covers every file the pipeline may fail to find; the original
/// behavior of "warn for images, die for includes" is expressed by the CLI
/// selecting [`Strict`](Self::Strict) while library callers default to
/// [`Lenient`](Self::Lenient).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingFilePolicy {
    /// Log a warning and render the affected feature as empty.
    #[default]
    Lenient,
    /// Fail the render.
    Strict,
}

/// Error type for pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// An include directive's target could not be read under
    /// [`MissingFilePolicy::Strict`].
    #[error("Included file not found: {}", .0.display())]
    MissingInclude(PathBuf),
    /// An include chain references a file already being expanded.
    #[error("Circular include: {}", .0.display())]
    CircularInclude(PathBuf),
}
