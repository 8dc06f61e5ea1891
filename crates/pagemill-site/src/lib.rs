//! Page rendering orchestration for Pagemill.
//!
//! Takes one authored document (YAML front matter + Markdown body), runs it
//! through the content pipeline and merges the result with a page layout:
//!
//! ```no_run
//! use pagemill_site::{RenderOptions, render};
//!
//! let input = "\n---\ntitle: Demo\n---\n# Hello\n";
//! let html = render(input, RenderOptions::default())?;
//! # Ok::<(), pagemill_site::SiteError>(())
//! ```
//!
//! All configuration lives in an immutable [`RenderContext`] built once per
//! call and threaded through every stage, so concurrent renders in one
//! process do not interfere with each other.

mod context;
mod front_matter;
mod helpers;
mod images;
mod render;

use std::path::PathBuf;

pub use context::{RenderContext, RenderOptions};
pub use front_matter::{FrontMatter, split_document};
pub use pagemill_renderer::MissingFilePolicy;
pub use render::render;

/// Error type for a whole-page render.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The YAML front matter failed to parse.
    #[error("Invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    /// A pipeline stage failed (missing include under strict policy,
    /// circular include).
    #[error("{0}")]
    Pipeline(#[from] pagemill_renderer::RenderError),
    /// Asset staging failed.
    #[error("{0}")]
    Asset(#[from] pagemill_assets::AssetError),
    /// A body image could not be resolved under the strict policy.
    #[error("Could not find image: {0}")]
    MissingAsset(String),
    /// No page layout was found in the source or built-in roots.
    #[error("Layout not found: {}", .0.display())]
    MissingLayout(PathBuf),
    /// The template engine reported an error.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}
