//! The `build` command.

use std::io::Write as _;
use std::path::PathBuf;

use clap::Args;

use pagemill_site::{MissingFilePolicy, RenderOptions, render};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the `build` command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Input Markdown document.
    input: PathBuf,

    /// Write the rendered page to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Project source root for assets, includes and the layout.
    #[arg(long, env = "PAGEMILL_SOURCE")]
    source: Option<PathBuf>,

    /// Output root the staged asset tree is written under.
    #[arg(long, env = "PAGEMILL_WEB_ROOT")]
    web_root: Option<PathBuf>,

    /// Embed assets into the page instead of linking them (implies --minify).
    #[arg(long)]
    inline: bool,

    /// Bundle the scripts referenced by the page's script manifest.
    #[arg(long)]
    minify: bool,

    /// Skip HTML sanitization.
    #[arg(long = "unsafe")]
    unsafe_html: bool,

    /// Also link the theme's *_overrides.css stylesheets.
    #[arg(long)]
    custom_css: bool,

    /// Extra stylesheet linked alongside the theme sheets.
    #[arg(long)]
    css: Option<String>,

    /// Logo image name.
    #[arg(long)]
    logo: Option<String>,

    /// Wrap the logo in a link to this URL.
    #[arg(long)]
    logo_url: Option<String>,

    /// Enable inline attribute syntax in Markdown headings.
    #[arg(long)]
    attr: bool,

    /// Disable bare-URL autolinking.
    #[arg(long)]
    no_links: bool,

    /// Verbose logging.
    #[arg(long, short)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Render the input document and write the result.
    ///
    /// Running from the CLI makes every missing file fatal: a document that
    /// references an asset or include that cannot be found exits non-zero
    /// instead of producing a silently degraded page.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let input = std::fs::read_to_string(&self.input)?;

        let options = RenderOptions {
            source: self.source,
            web_root: self.web_root,
            inline: self.inline,
            minify: self.minify,
            unsafe_html: self.unsafe_html,
            custom_css: self.custom_css,
            css: self.css,
            logo: self.logo,
            logo_url: self.logo_url,
            attr: self.attr,
            no_links: self.no_links,
            missing_files: MissingFilePolicy::Strict,
        };

        let html = render(&input, options)?;
        tracing::info!(bytes = html.len(), input = %self.input.display(), "rendered");

        match &self.output {
            Some(path) => {
                std::fs::write(path, html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
            }
        }
        Ok(())
    }
}
