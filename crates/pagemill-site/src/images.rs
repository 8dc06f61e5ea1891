//! Rewriting body image references to staged paths.
//!
//! Images written in Markdown (`![alt](logo.png)`) come out of the renderer
//! with their logical name as `src`. This pass resolves each one the same
//! way the `image_tag` helper does: stage into the output tree, or embed as
//! a data URI in inline mode. External and already-embedded sources are
//! left alone; an unresolvable image degrades to nothing (or fails the
//! render under the strict policy).

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use pagemill_assets::data_uri;
use pagemill_renderer::MissingFilePolicy;

use crate::SiteError;
use crate::context::RenderContext;

static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\s[^>]*src="([^"]*)"[^>]*>"#).expect("valid img regex"));

/// Rewrite every local `<img>` source in `html` to its final form.
pub(crate) fn rewrite_image_sources(html: &str, ctx: &RenderContext) -> Result<String, SiteError> {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for caps in IMG_RE.captures_iter(html) {
        let (whole, src) = (caps.get(0).expect("match"), caps.get(1).expect("group"));
        out.push_str(&html[last..whole.start()]);
        last = whole.end();

        if is_external(src.as_str()) {
            out.push_str(whole.as_str());
            continue;
        }
        match ctx.resolver.resolve(src.as_str(), None) {
            Some(path) => {
                let new_src = if ctx.options.inline {
                    data_uri(&path)?
                } else {
                    ctx.stager.stage(&ctx.local.folder_for(src.as_str()), &path)?
                };
                out.push_str(&html[whole.start()..src.start()]);
                out.push_str(&new_src);
                out.push_str(&html[src.end()..whole.end()]);
            }
            None if ctx.missing_files() == MissingFilePolicy::Strict => {
                return Err(SiteError::MissingAsset(src.as_str().to_owned()));
            }
            None => {
                // The tag renders as nothing rather than a broken link
                warn!(src = src.as_str(), "dropping unresolvable image");
            }
        }
    }

    out.push_str(&html[last..]);
    Ok(out)
}

/// Sources the rewrite must not touch: remote URLs and embedded data.
fn is_external(src: &str) -> bool {
    src.starts_with("http://")
        || src.starts_with("https://")
        || src.starts_with("//")
        || src.starts_with("data:")
}
