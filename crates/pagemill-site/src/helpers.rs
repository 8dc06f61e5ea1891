//! Template helper functions.
//!
//! These are the callables every page layout depends on; their names are a
//! compatibility contract: `toc_data`, `partial`, `image_tag`,
//! `logo_image_tag`, `stylesheet_link_tag`, `javascript_include_tag` and
//! `language_array`. Each holds the render's [`RenderContext`], so asset
//! staging happens at the moment the tag string is produced and the emitted
//! path is always final.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tera::{Function, Result as TeraResult, Tera};
use tracing::warn;

use pagemill_assets::data_uri;
use pagemill_renderer::{
    MissingFilePolicy, build_toc, escape_html, normalize_heading_ids, render_markdown,
};

use crate::context::RenderContext;

/// Register every helper on the template instance.
pub(crate) fn register(tera: &mut Tera, ctx: &Arc<RenderContext>, heading_level: u8) {
    tera.register_function("toc_data", TocData { heading_level });
    tera.register_function("partial", Partial { ctx: Arc::clone(ctx) });
    tera.register_function("image_tag", ImageTag { ctx: Arc::clone(ctx) });
    tera.register_function("logo_image_tag", LogoImageTag { ctx: Arc::clone(ctx) });
    tera.register_function(
        "stylesheet_link_tag",
        StylesheetLinkTag { ctx: Arc::clone(ctx) },
    );
    tera.register_function(
        "javascript_include_tag",
        JavascriptIncludeTag { ctx: Arc::clone(ctx) },
    );
    tera.register_function("language_array", LanguageArray);
}

/// `toc_data(content=…)`: nested heading outline of the rendered page.
struct TocData {
    heading_level: u8,
}

impl Function for TocData {
    fn call(&self, args: &HashMap<String, Value>) -> TeraResult<Value> {
        let content = required_str(args, "content", "toc_data")?;
        Ok(serde_json::to_value(build_toc(content, self.heading_level))?)
    }
}

/// `partial(name=…)`: render `includes/_{name}.md` through the content
/// pipeline and return the HTML fragment.
struct Partial {
    ctx: Arc<RenderContext>,
}

impl Function for Partial {
    fn call(&self, args: &HashMap<String, Value>) -> TeraResult<Value> {
        let name = required_str(args, "name", "partial")?;
        let path = self
            .ctx
            .src
            .root()
            .join("includes")
            .join(format!("_{name}.md"));
        let Ok(content) = std::fs::read_to_string(&path) else {
            warn!(path = %path.display(), "partial not found");
            return degrade(&self.ctx, &path.display().to_string());
        };
        let cleaned = self.ctx.sanitizer.clean(&content);
        let html = render_markdown(&cleaned, &self.ctx.markdown_options(), &self.ctx.highlighter);
        Ok(Value::String(normalize_heading_ids(&html)))
    }
}

/// `image_tag(image=…, alt=…, class=…)`: resolve, stage (or embed) and tag
/// an image.
struct ImageTag {
    ctx: Arc<RenderContext>,
}

impl Function for ImageTag {
    fn call(&self, args: &HashMap<String, Value>) -> TeraResult<Value> {
        let image = required_str(args, "image", "image_tag")?;
        let alt = optional_str(args, "alt", "");
        let class = optional_str(args, "class", "");
        match image_source(&self.ctx, image)? {
            Some(src) => Ok(Value::String(img_tag(&src, class, alt))),
            None => degrade(&self.ctx, image),
        }
    }
}

/// `logo_image_tag()`: the configured logo (or the default logo asset),
/// optionally wrapped in a link.
struct LogoImageTag {
    ctx: Arc<RenderContext>,
}

impl Function for LogoImageTag {
    fn call(&self, _args: &HashMap<String, Value>) -> TeraResult<Value> {
        let Some(logo) = self.ctx.options.logo.as_deref() else {
            // No logo configured: fall back to the stock asset, no link wrap
            return match image_source(&self.ctx, "logo.png")? {
                Some(src) => Ok(Value::String(img_tag(&src, "logo", "Logo"))),
                None => degrade(&self.ctx, "logo.png"),
            };
        };
        match image_source(&self.ctx, logo)? {
            Some(src) => {
                let mut tag = img_tag(&src, "logo", "Logo");
                if let Some(url) = &self.ctx.options.logo_url {
                    tag = format!(r#"<a href="{}">{tag}</a>"#, escape_html(url));
                }
                Ok(Value::String(tag))
            }
            None => degrade(&self.ctx, logo),
        }
    }
}

/// `stylesheet_link_tag(stylesheet=…, media=…)`: link (or inline) the named
/// stylesheet plus any configured overrides.
struct StylesheetLinkTag {
    ctx: Arc<RenderContext>,
}

impl Function for StylesheetLinkTag {
    fn call(&self, args: &HashMap<String, Value>) -> TeraResult<Value> {
        let stylesheet = required_str(args, "stylesheet", "stylesheet_link_tag")?;
        let media = optional_str(args, "media", "screen");
        let ctx = &self.ctx;

        // Override sheets only apply to the two base sheets; anything else
        // shares the generic theme override.
        let is_base = stylesheet == "print" || stylesheet == "screen";
        let override_name = if is_base { stylesheet } else { "theme" };

        let mut sources = Vec::new();
        match ctx.resolver.resolve(&format!("{stylesheet}.css"), None) {
            Some(path) => sources.push(path),
            None => {
                if ctx.missing_files() == MissingFilePolicy::Strict {
                    return Err(tera::Error::msg(format!(
                        "could not find stylesheet {stylesheet}.css"
                    )));
                }
            }
        }
        if ctx.options.custom_css
            && is_base
            && let Some(path) = ctx
                .resolver
                .resolve(&format!("{override_name}_overrides.css"), None)
        {
            sources.push(path);
        }
        if let Some(css) = &ctx.options.css
            && is_base
            && let Some(path) = ctx.resolver.resolve(css, None)
        {
            sources.push(path);
        }

        let tags = sources
            .iter()
            .map(|path| stylesheet_tag(ctx, path, media))
            .collect::<TeraResult<Vec<_>>>()?;
        Ok(Value::String(tags.join("\n")))
    }
}

fn stylesheet_tag(ctx: &RenderContext, path: &Path, media: &str) -> TeraResult<String> {
    if ctx.options.inline {
        let content = std::fs::read_to_string(path).map_err(|e| {
            tera::Error::msg(format!("could not read stylesheet {}: {e}", path.display()))
        })?;
        // Sheet-relative url() references break once the CSS is inlined into
        // the page; point them at the staged asset tree instead.
        let web_root = ctx.web.root().to_string_lossy().replace('\\', "/");
        let content = content
            .replace("../fonts/", &format!("{web_root}/fonts/"))
            .replace("../img/", &format!("{web_root}/img/"));
        Ok(format!(r#"<style media="{}">{content}</style>"#, escape_html(media)))
    } else {
        let href = ctx
            .stager
            .stage(&ctx.local.css(), path)
            .map_err(|e| tera::Error::msg(e.to_string()))?;
        Ok(format!(
            r#"<link rel="stylesheet" media="{}" href="{}">"#,
            escape_html(media),
            escape_html(&href)
        ))
    }
}

/// `javascript_include_tag(name=…)`: expand the page's script manifest,
/// staging or bundling the scripts it references.
struct JavascriptIncludeTag {
    ctx: Arc<RenderContext>,
}

impl Function for JavascriptIncludeTag {
    fn call(&self, args: &HashMap<String, Value>) -> TeraResult<Value> {
        let name = required_str(args, "name", "javascript_include_tag")?;
        let ctx = &self.ctx;

        let Some(manifest_path) = ctx.resolver.resolve(&format!("{name}.inc"), None) else {
            return degrade(ctx, &format!("{name}.inc"));
        };
        let manifest = std::fs::read_to_string(&manifest_path).map_err(|e| {
            tera::Error::msg(format!(
                "could not read script manifest {}: {e}",
                manifest_path.display()
            ))
        })?;
        let web_js = ctx.web.js().to_string_lossy().replace('\\', "/");

        if !ctx.options.minify {
            // Stage each referenced script so the manifest's links resolve
            // from the output tree.
            for script in local_scripts(&manifest) {
                match ctx.resolver.resolve(script, None) {
                    Some(path) => {
                        ctx.stager
                            .stage(&ctx.local.folder_for(script), &path)
                            .map_err(|e| tera::Error::msg(e.to_string()))?;
                    }
                    None if ctx.missing_files() == MissingFilePolicy::Strict => {
                        return Err(tera::Error::msg(format!("could not find script {script}")));
                    }
                    None => {}
                }
            }
            return Ok(Value::String(manifest.replace("|PATH|", &web_js)));
        }

        let mut bundle = String::new();
        for script in local_scripts(&manifest) {
            match ctx.resolver.resolve(script, None) {
                Some(path) => {
                    let source = std::fs::read_to_string(&path).map_err(|e| {
                        tera::Error::msg(format!("could not read script {}: {e}", path.display()))
                    })?;
                    bundle.push_str(&source);
                    if !bundle.ends_with('\n') {
                        bundle.push('\n');
                    }
                }
                None if ctx.missing_files() == MissingFilePolicy::Strict => {
                    return Err(tera::Error::msg(format!("could not find script {script}")));
                }
                None => {}
            }
        }

        if ctx.options.inline {
            Ok(Value::String(format!("<script>{bundle}</script>")))
        } else {
            let dest = ctx.local.js().join(format!("{name}.js"));
            let src = ctx
                .stager
                .write(&dest, &bundle)
                .map_err(|e| tera::Error::msg(e.to_string()))?;
            Ok(Value::String(format!(
                r#"<script src="{}"></script>"#,
                escape_html(&src)
            )))
        }
    }
}

/// `language_array(tabs=…)`: flatten language-tab descriptors into a JSON
/// array of names with quotes HTML-escaped.
struct LanguageArray;

impl Function for LanguageArray {
    fn call(&self, args: &HashMap<String, Value>) -> TeraResult<Value> {
        let names: Vec<String> = match args.get("tabs") {
            Some(Value::Array(tabs)) => tabs.iter().filter_map(tab_name).collect(),
            _ => Vec::new(),
        };
        let json = serde_json::to_string(&names)?;
        Ok(Value::String(json.replace('"', "&quot;")))
    }
}

/// Display name of one language-tab descriptor: a bare string, or the key
/// of a single-key mapping.
fn tab_name(tab: &Value) -> Option<String> {
    match tab {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => map.keys().next().cloned(),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Script paths referenced by a manifest, skipping remote URLs.
fn local_scripts(manifest: &str) -> impl Iterator<Item = &str> {
    manifest
        .lines()
        .filter_map(|line| line.split('"').nth(1))
        .filter(|value| *value != "text/javascript")
        .filter(|value| !value.starts_with("http://") && !value.starts_with("https://"))
        .filter_map(|value| Path::new(value).file_name().and_then(|f| f.to_str()))
}

/// Resolved `src` attribute for an image: a staged web path, or a data URI
/// in inline mode. `None` when the image cannot be found.
fn image_source(ctx: &RenderContext, name: &str) -> TeraResult<Option<String>> {
    let Some(path) = ctx.resolver.resolve(name, None) else {
        return Ok(None);
    };
    let src = if ctx.options.inline {
        data_uri(&path).map_err(|e| tera::Error::msg(e.to_string()))?
    } else {
        ctx.stager
            .stage(&ctx.local.img(), &path)
            .map_err(|e| tera::Error::msg(e.to_string()))?
    };
    Ok(Some(src))
}

fn img_tag(src: &str, class: &str, alt: &str) -> String {
    format!(
        r#"<img src="{}" class="{}" alt="{}">"#,
        escape_html(src),
        escape_html(class),
        escape_html(alt)
    )
}

/// Empty output or an error for a missing file, per the active policy.
fn degrade(ctx: &RenderContext, what: &str) -> TeraResult<Value> {
    match ctx.missing_files() {
        MissingFilePolicy::Lenient => Ok(Value::String(String::new())),
        MissingFilePolicy::Strict => Err(tera::Error::msg(format!("could not find {what}"))),
    }
}

fn required_str<'a>(
    args: &'a HashMap<String, Value>,
    name: &str,
    function: &str,
) -> TeraResult<&'a str> {
    args.get(name).and_then(Value::as_str).ok_or_else(|| {
        tera::Error::msg(format!("`{function}` requires a string `{name}` argument"))
    })
}

fn optional_str<'a>(args: &'a HashMap<String, Value>, name: &str, default: &'a str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or(default)
}
