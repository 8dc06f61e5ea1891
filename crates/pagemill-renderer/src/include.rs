//! Include-directive expansion.
//!
//! Two directive syntaxes are recognized, each on a line of its own:
//!
//! - `include::relative/path.md[]`
//! - `!INCLUDE relative/path.md`
//!
//! The referenced file's lines replace the directive line, and expansion
//! continues inside the spliced content, so includes nest arbitrarily.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{MissingFilePolicy, RenderError};

/// Expands include directives against a project source root.
pub struct IncludeExpander {
    src_root: PathBuf,
    policy: MissingFilePolicy,
}

impl IncludeExpander {
    /// Create an expander resolving directives relative to `src_root`.
    #[must_use]
    pub fn new(src_root: impl Into<PathBuf>, policy: MissingFilePolicy) -> Self {
        Self {
            src_root: src_root.into(),
            policy,
        }
    }

    /// Expand every include directive in `body`, recursively.
    ///
    /// An unreadable target degrades to an empty splice under
    /// [`MissingFilePolicy::Lenient`] and fails the expansion under
    /// [`MissingFilePolicy::Strict`]. A file including itself, directly or
    /// through intermediates, is an error in both policies.
    pub fn expand(&self, body: &str) -> Result<String, RenderError> {
        let mut out = Vec::new();
        let mut in_progress = HashSet::new();
        self.expand_into(body, &mut out, &mut in_progress)?;
        Ok(out.join("\n"))
    }

    fn expand_into(
        &self,
        text: &str,
        out: &mut Vec<String>,
        in_progress: &mut HashSet<PathBuf>,
    ) -> Result<(), RenderError> {
        for line in text.replace('\r', "").split('\n') {
            if let Some(name) = parse_directive(line) {
                self.splice(name, out, in_progress)?;
            } else {
                out.push(line.to_owned());
            }
        }
        Ok(())
    }

    fn splice(
        &self,
        name: &str,
        out: &mut Vec<String>,
        in_progress: &mut HashSet<PathBuf>,
    ) -> Result<(), RenderError> {
        let path = if Path::new(name).is_absolute() {
            PathBuf::from(name)
        } else {
            self.src_root.join(name)
        };
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !in_progress.insert(key.clone()) {
            return Err(RenderError::CircularInclude(path));
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => self.expand_into(&content, out, in_progress)?,
            Err(_) if self.policy == MissingFilePolicy::Strict => {
                return Err(RenderError::MissingInclude(path));
            }
            Err(_) => {
                // Empty splice: the directive line disappears from the output
                warn!(path = %path.display(), "included file not found");
            }
        }

        in_progress.remove(&key);
        Ok(())
    }
}

/// Parse a line as an include directive, returning the target filename.
fn parse_directive(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("include::") {
        rest.strip_suffix("[]")
    } else {
        line.strip_prefix("!INCLUDE ")
    }
}
