//! Render options and the per-render context.

use std::path::{Path, PathBuf};

use pagemill_assets::{AssetDirs, AssetResolver, AssetStager};
use pagemill_renderer::{Highlighter, MarkdownOptions, MissingFilePolicy, Sanitizer};

use crate::SiteError;

/// Built-in fallback asset root shipped with the crate.
const DEFAULT_INTERNAL_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../theme");
/// Default staging root when the caller does not override it.
const DEFAULT_WEB_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../pub");

/// Options for one render call.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Project source root; assets and includes resolve here first.
    /// Defaults to the built-in theme root.
    pub source: Option<PathBuf>,
    /// Staging root the finished asset tree is written under.
    pub web_root: Option<PathBuf>,
    /// Embed assets into the HTML instead of linking them. Implies `minify`.
    pub inline: bool,
    /// Bundle the scripts referenced by the page's script manifest.
    pub minify: bool,
    /// Skip sanitization entirely.
    pub unsafe_html: bool,
    /// Also link the `*_overrides.css` stylesheets.
    pub custom_css: bool,
    /// Extra stylesheet path linked alongside the theme sheets.
    pub css: Option<String>,
    /// Logo image name; the default logo asset is used when unset.
    pub logo: Option<String>,
    /// Wrap the logo in a link to this URL.
    pub logo_url: Option<String>,
    /// Enable inline attribute syntax in Markdown headings.
    pub attr: bool,
    /// Disable bare-URL autolinking.
    pub no_links: bool,
    /// What to do when an include or asset cannot be found.
    pub missing_files: MissingFilePolicy,
}

/// Everything one render needs, built once and never mutated.
///
/// Replaces ambient configuration with an explicit value passed through
/// every stage and template helper, which makes concurrent renders in the
/// same process safe to run without external serialization.
pub struct RenderContext {
    pub(crate) internal: AssetDirs,
    pub(crate) src: AssetDirs,
    pub(crate) local: AssetDirs,
    pub(crate) web: AssetDirs,
    pub(crate) resolver: AssetResolver,
    pub(crate) stager: AssetStager,
    pub(crate) highlighter: Highlighter,
    pub(crate) sanitizer: Sanitizer,
    pub(crate) options: RenderOptions,
}

impl RenderContext {
    /// Build the context for one render call.
    ///
    /// Creates the staging tree's subfolders; `inline` forces `minify` on.
    pub fn new(mut options: RenderOptions) -> Result<Self, SiteError> {
        if options.inline {
            options.minify = true;
        }

        let internal = AssetDirs::new(DEFAULT_INTERNAL_ROOT)?;
        let src = match &options.source {
            Some(source) => AssetDirs::new(source)?,
            None => internal.clone(),
        };
        let local = AssetDirs::new(
            options
                .web_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WEB_ROOT)),
        )?;
        let web = AssetDirs::new(web_root_name(local.root()))?;

        let resolver = AssetResolver::new(
            src.clone(),
            internal.clone(),
            internal.root().join("styles"),
        );
        let stager = AssetStager::new(local.clone(), web.clone());
        let sanitizer = Sanitizer::new(!options.unsafe_html);
        let highlighter = Highlighter::new();

        Ok(Self {
            internal,
            src,
            local,
            web,
            resolver,
            stager,
            highlighter,
            sanitizer,
            options,
        })
    }

    /// The active missing-file policy.
    #[must_use]
    pub fn missing_files(&self) -> MissingFilePolicy {
        self.options.missing_files
    }

    /// Markdown feature toggles derived from the render options.
    #[must_use]
    pub fn markdown_options(&self) -> MarkdownOptions {
        MarkdownOptions {
            attributes: self.options.attr,
            autolink: !self.options.no_links,
        }
    }
}

/// The web-facing prefix of the staging tree: its root's base name.
fn web_root_name(local_root: &Path) -> String {
    local_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
