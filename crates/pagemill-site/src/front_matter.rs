//! Front matter parsing and document splitting.

use serde_yaml::{Mapping, Value};

/// Depth limit for the table of contents when the document sets none.
const DEFAULT_HEADING_LEVEL: u8 = 2;

/// Parsed YAML front matter.
///
/// Everything except the keys the renderer itself reads is passed through
/// to the page layout untouched as `current_page.data`.
#[derive(Clone, Debug, Default)]
pub struct FrontMatter(Mapping);

impl FrontMatter {
    /// Parse front matter from a YAML block.
    ///
    /// Blank input yields an empty mapping. Malformed YAML is a hard error;
    /// the rest of the render depends on this metadata.
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map(Self)
    }

    /// TOC depth requested by the document (`headingLevel`), default 2.
    #[must_use]
    pub fn heading_level(&self) -> u8 {
        self.0
            .get("headingLevel")
            .and_then(Value::as_u64)
            .and_then(|level| u8::try_from(level).ok())
            .unwrap_or(DEFAULT_HEADING_LEVEL)
    }

    /// The underlying mapping, for handing to the template.
    #[must_use]
    pub fn mapping(&self) -> &Mapping {
        &self.0
    }
}

/// Split a raw document into its front matter block and body.
///
/// Line endings are normalized first. The document is then split on the
/// first two occurrences of a standalone `---` line (a trailing space after
/// the hyphens is tolerated); later `---` lines stay part of the body. A
/// document without any delimiter has no front matter, and the whole input
/// is the body.
#[must_use]
pub fn split_document(input: &str) -> (String, String) {
    let normalized = input.replace("\r\n", "\n");
    let prefixed = format!("\n{normalized}");

    for separator in ["\n---\n", "\n--- \n"] {
        let mut parts = prefixed.splitn(3, separator);
        let _leading = parts.next();
        let Some(header) = parts.next() else {
            continue;
        };
        let body = parts.next().unwrap_or_default();
        return (header.to_owned(), body.to_owned());
    }

    (String::new(), normalized)
}
