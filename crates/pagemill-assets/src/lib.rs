//! Asset resolution and staging for the Pagemill renderer.
//!
//! A rendered page references images, stylesheets and scripts by logical
//! name. This crate turns those names into concrete files:
//!
//! - [`AssetDirs`]: one directory root with its conventional `css`/`fonts`/
//!   `img`/`js` subfolders
//! - [`AssetResolver`]: ordered search across several candidate roots
//! - [`AssetStager`]: copies resolved assets into the staging tree and
//!   derives the web-relative path the emitted HTML should use

mod dirs;
mod resolver;
mod stager;

use std::path::PathBuf;

pub use dirs::AssetDirs;
pub use resolver::AssetResolver;
pub use stager::{AssetStager, data_uri};

/// Error type for asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// I/O error while creating, copying or reading a file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path the operation failed on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A staged path ended up outside the staging root.
    #[error("Destination {} is outside the staging root {}", .dest.display(), .root.display())]
    OutsideRoot {
        /// The offending destination.
        dest: PathBuf,
        /// The staging root.
        root: PathBuf,
    },
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
