//! Copying and writing assets into the staging tree.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::{AssetDirs, AssetError};
use crate::dirs::absolute;

/// Stages assets into the output tree and derives web-relative paths.
///
/// The staging tree lives under a local root (e.g. `/build/pub`); the HTML
/// references files through the web root (e.g. `pub`). Staging a file
/// returns the path the emitted tag should carry: the local prefix is
/// stripped, the web prefix is prepended, and separators are normalized to
/// `/` regardless of platform.
#[derive(Clone, Debug)]
pub struct AssetStager {
    local: AssetDirs,
    web: AssetDirs,
}

impl AssetStager {
    /// Create a stager writing under `local` and addressing via `web`.
    #[must_use]
    pub fn new(local: AssetDirs, web: AssetDirs) -> Self {
        Self { local, web }
    }

    /// Copy `source` into `dest_folder`, preserving its base name.
    ///
    /// The destination folder is created if absent. Staging the same source
    /// twice simply overwrites; the returned web path is identical.
    pub fn stage(&self, dest_folder: &Path, source: &Path) -> Result<String, AssetError> {
        std::fs::create_dir_all(dest_folder)
            .map_err(|e| AssetError::io(dest_folder.to_path_buf(), e))?;
        let file_name = source.file_name().unwrap_or(source.as_os_str());
        let dest = absolute(&dest_folder.join(file_name));
        std::fs::copy(source, &dest).map_err(|e| AssetError::io(source.to_path_buf(), e))?;
        self.web_path(&dest)
    }

    /// Write generated text to `dest_path` and return its web path.
    pub fn write(&self, dest_path: &Path, data: &str) -> Result<String, AssetError> {
        let dest = absolute(dest_path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AssetError::io(parent.to_path_buf(), e))?;
        }
        std::fs::write(&dest, data).map_err(|e| AssetError::io(dest.clone(), e))?;
        self.web_path(&dest)
    }

    /// Web-relative path for a file under the staging root.
    fn web_path(&self, dest: &Path) -> Result<String, AssetError> {
        let relative = dest
            .strip_prefix(self.local.root())
            .map_err(|_| AssetError::OutsideRoot {
                dest: dest.to_path_buf(),
                root: self.local.root().to_path_buf(),
            })?;
        let joined = self.web.root().join(relative);
        Ok(joined.to_string_lossy().replace('\\', "/"))
    }
}

/// Read a file and embed it as a base64 data URI.
///
/// The media type comes from the file extension, defaulting to
/// `application/octet-stream` for unknown extensions.
pub fn data_uri(path: &Path) -> Result<String, AssetError> {
    let bytes = std::fs::read(path).map_err(|e| AssetError::io(path.to_path_buf(), e))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}
