//! Syntax highlighting for fenced code blocks.

use std::collections::HashMap;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::warn;

use crate::util::escape_html;

/// CSS class prefix on emitted highlight spans, matched by the bundled
/// `styles/highlight.css` stylesheet.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syntax-" };

/// Class-based syntax highlighter keyed by fence language tag.
///
/// A tag of the form `lang--variant` highlights as `lang` while the emitted
/// `tab-lang--variant` class keeps the variants distinct, so one language
/// can appear in several tabs. Aliases are fixed at construction; there is
/// no mutable registry to update at render time.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    aliases: HashMap<String, String>,
}

impl Highlighter {
    /// Create a highlighter with the default alias table
    /// (`shell`/`sh` → `bash`).
    #[must_use]
    pub fn new() -> Self {
        Self::with_aliases(
            [("shell", "bash"), ("sh", "bash")]
                .into_iter()
                .map(|(from, to)| (from.to_owned(), to.to_owned()))
                .collect(),
        )
    }

    /// Create a highlighter with an explicit alias table mapping fence
    /// language tags to syntax names.
    #[must_use]
    pub fn with_aliases(aliases: HashMap<String, String>) -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            aliases,
        }
    }

    /// Render a code block as a `<pre><code>` fragment.
    ///
    /// Known languages get classed highlight spans and a `tab-{tag}` class;
    /// unknown languages and untagged blocks fall back to escaped plain
    /// text. Highlighting failures degrade to the plain fallback.
    #[must_use]
    pub fn highlight(&self, tag: &str, code: &str) -> String {
        let language = tag.split("--").next().unwrap_or_default();
        match self.find_syntax(language) {
            Some(syntax) => match self.classed_spans(syntax, code) {
                Ok(spans) => format!(
                    r#"<pre class="highlight tab tab-{}"><code>{spans}</code></pre>"#,
                    escape_html(tag)
                ),
                Err(err) => {
                    warn!(language, error = %err, "highlighting failed");
                    plain_block(code)
                }
            },
            None => plain_block(code),
        }
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }
        let token = self
            .aliases
            .get(language)
            .map_or(language, String::as_str)
            .to_ascii_lowercase();
        self.syntaxes.find_syntax_by_token(&token)
    }

    fn classed_spans(
        &self,
        syntax: &SyntaxReference,
        code: &str,
    ) -> Result<String, syntect::Error> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn plain_block(code: &str) -> String {
    format!(
        r#"<pre class="highlight"><code>{}</code></pre>"#,
        escape_html(code)
    )
}
