//! Directory-set abstraction for asset roots.

use std::path::{Path, PathBuf};

use crate::AssetError;

/// Subfolder names every asset root carries, in search order.
pub(crate) const SUBFOLDERS: [&str; 4] = ["img", "js", "css", "fonts"];

/// One asset root and its conventional subfolders.
///
/// Real roots (anything containing a path separator) are normalized to an
/// absolute path and their subfolders created on construction. A root
/// without a separator is *virtual*: it names the web-facing prefix of the
/// staging tree, its paths are computed but the filesystem is never touched.
///
/// # Example
///
/// ```
/// use pagemill_assets::AssetDirs;
///
/// let web = AssetDirs::new("pub").unwrap();
/// assert!(web.is_virtual());
/// assert_eq!(web.css(), std::path::Path::new("pub/css"));
/// ```
#[derive(Clone, Debug)]
pub struct AssetDirs {
    root: PathBuf,
    virtual_root: bool,
}

impl AssetDirs {
    /// Create a directory set rooted at `root`.
    ///
    /// For real roots the four subfolders are created if absent; creating
    /// an existing folder is a no-op.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, AssetError> {
        let root = root.as_ref();
        let virtual_root = root.components().count() <= 1 && root.is_relative();
        let dirs = if virtual_root {
            Self {
                root: root.to_path_buf(),
                virtual_root,
            }
        } else {
            let dirs = Self {
                root: absolute(root),
                virtual_root,
            };
            dirs.create_subfolders()?;
            dirs
        };
        Ok(dirs)
    }

    /// Whether this set only computes paths without touching the filesystem.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.virtual_root
    }

    /// The root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The stylesheet subfolder.
    #[must_use]
    pub fn css(&self) -> PathBuf {
        self.root.join("css")
    }

    /// The fonts subfolder.
    #[must_use]
    pub fn fonts(&self) -> PathBuf {
        self.root.join("fonts")
    }

    /// The image subfolder.
    #[must_use]
    pub fn img(&self) -> PathBuf {
        self.root.join("img")
    }

    /// The script subfolder.
    #[must_use]
    pub fn js(&self) -> PathBuf {
        self.root.join("js")
    }

    /// Subfolder by name, for iterating the conventional set.
    #[must_use]
    pub fn subfolder(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Map a filename to the subfolder its extension belongs in.
    ///
    /// Unrecognized extensions (and extension-less names) map to the root.
    #[must_use]
    pub fn folder_for(&self, filename: &str) -> PathBuf {
        match subfolder_for_extension(filename) {
            Some(sub) => self.root.join(sub),
            None => self.root.clone(),
        }
    }

    fn create_subfolders(&self) -> Result<(), AssetError> {
        for sub in SUBFOLDERS {
            let path = self.root.join(sub);
            std::fs::create_dir_all(&path).map_err(|e| AssetError::io(path, e))?;
        }
        Ok(())
    }
}

/// Conventional subfolder for a filename's extension, if any.
pub(crate) fn subfolder_for_extension(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?;
    match ext.to_ascii_lowercase().as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "ico" | "webp" => Some("img"),
        "js" | "mjs" => Some("js"),
        "css" => Some("css"),
        "ttf" | "otf" | "woff" | "woff2" | "eot" => Some("fonts"),
        _ => None,
    }
}

/// Normalize a path to absolute without requiring it to exist.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
