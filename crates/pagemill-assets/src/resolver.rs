//! Ordered search for logical asset names across candidate roots.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::AssetDirs;
use crate::dirs::{SUBFOLDERS, absolute, subfolder_for_extension};

/// Resolves logical asset names to concrete paths.
///
/// A logical name like `logo.png` or `screen.css` carries no directory; the
/// resolver probes a fixed list of candidate locations and returns the first
/// that exists. The search order is stable, so repeated lookups of the same
/// name always return the same path.
#[derive(Clone, Debug)]
pub struct AssetResolver {
    src: AssetDirs,
    internal: AssetDirs,
    styles_dir: PathBuf,
}

impl AssetResolver {
    /// Create a resolver over the project source root, the built-in
    /// fallback root and the syntax-highlighting stylesheet directory.
    #[must_use]
    pub fn new(src: AssetDirs, internal: AssetDirs, styles_dir: PathBuf) -> Self {
        Self {
            src,
            internal,
            styles_dir,
        }
    }

    /// Resolve `name` to the first existing candidate path.
    ///
    /// Search order, first hit wins:
    ///
    /// 1. `initial_dir/name`, when an initial directory is given
    /// 2. `name` itself, when already absolute
    /// 3. `name` relative to the current working directory
    /// 4. per root (project source, then built-in fallback): the subfolder
    ///    matching the name's extension, then the root and each conventional
    ///    subfolder
    /// 5. the highlight-styles directory
    ///
    /// A miss is reported with a warning and returns `None`; callers decide
    /// whether that degrades the feature or aborts the render.
    #[must_use]
    pub fn resolve(&self, name: &str, initial_dir: Option<&Path>) -> Option<PathBuf> {
        let found = self.candidates(name, initial_dir).find(|p| p.is_file());
        match found {
            Some(ref path) => debug!(name, path = %path.display(), "resolved asset"),
            None => warn!(name, "could not find asset"),
        }
        found
    }

    fn candidates<'a>(
        &'a self,
        name: &'a str,
        initial_dir: Option<&'a Path>,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        let name_path = Path::new(name);
        let initial = initial_dir.map(|dir| dir.join(name));
        let literal = name_path.is_absolute().then(|| name_path.to_path_buf());
        let cwd_relative = (!name_path.is_absolute()).then(|| absolute(name_path));

        let per_root = [&self.src, &self.internal].into_iter().flat_map(move |dirs| {
            let typed = subfolder_for_extension(name).map(|sub| dirs.subfolder(sub).join(name));
            let conventional = std::iter::once(dirs.root().join(name))
                .chain(SUBFOLDERS.iter().map(move |sub| dirs.subfolder(sub).join(name)));
            typed.into_iter().chain(conventional)
        });

        initial
            .into_iter()
            .chain(literal)
            .chain(cwd_relative)
            .chain(per_root)
            .chain(std::iter::once(self.styles_dir.join(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, AssetResolver) {
        let tmp = tempfile::tempdir().unwrap();
        let src = AssetDirs::new(tmp.path().join("src")).unwrap();
        let internal = AssetDirs::new(tmp.path().join("internal")).unwrap();
        let styles = tmp.path().join("styles");
        std::fs::create_dir_all(&styles).unwrap();
        let resolver = AssetResolver::new(src, internal, styles);
        (tmp, resolver)
    }

    #[test]
    fn test_resolve_from_typed_subfolder() {
        let (tmp, resolver) = fixture();
        let path = tmp.path().join("src/img/logo.png");
        std::fs::write(&path, b"png").unwrap();

        assert_eq!(resolver.resolve("logo.png", None), Some(path));
    }

    #[test]
    fn test_src_wins_over_internal() {
        let (tmp, resolver) = fixture();
        let in_src = tmp.path().join("src/css/screen.css");
        let in_internal = tmp.path().join("internal/css/screen.css");
        std::fs::write(&in_src, b"src").unwrap();
        std::fs::write(&in_internal, b"internal").unwrap();

        assert_eq!(resolver.resolve("screen.css", None), Some(in_src));
    }

    #[test]
    fn test_internal_used_when_src_lacks_file() {
        let (tmp, resolver) = fixture();
        let in_internal = tmp.path().join("internal/css/print.css");
        std::fs::write(&in_internal, b"internal").unwrap();

        assert_eq!(resolver.resolve("print.css", None), Some(in_internal));
    }

    #[test]
    fn test_initial_dir_takes_priority() {
        let (tmp, resolver) = fixture();
        let extra = tmp.path().join("extra");
        std::fs::create_dir_all(&extra).unwrap();
        std::fs::write(extra.join("logo.png"), b"extra").unwrap();
        std::fs::write(tmp.path().join("src/img/logo.png"), b"src").unwrap();

        assert_eq!(
            resolver.resolve("logo.png", Some(&extra)),
            Some(extra.join("logo.png"))
        );
    }

    #[test]
    fn test_absolute_path_resolves_to_itself() {
        let (tmp, resolver) = fixture();
        let file = tmp.path().join("standalone.css");
        std::fs::write(&file, b"x").unwrap();

        let name = file.to_str().unwrap();
        assert_eq!(resolver.resolve(name, None), Some(file));
    }

    #[test]
    fn test_styles_dir_is_last_resort() {
        let (tmp, resolver) = fixture();
        let sheet = tmp.path().join("styles/monokai.css");
        std::fs::write(&sheet, b"theme").unwrap();

        assert_eq!(resolver.resolve("monokai.css", None), Some(sheet));
    }

    #[test]
    fn test_missing_asset_returns_none() {
        let (_tmp, resolver) = fixture();
        assert_eq!(resolver.resolve("nope.png", None), None);
    }

    #[test]
    fn test_resolution_is_stable_across_calls() {
        let (tmp, resolver) = fixture();
        std::fs::write(tmp.path().join("src/js/app.js"), b"js").unwrap();
        std::fs::write(tmp.path().join("internal/js/app.js"), b"js2").unwrap();

        let first = resolver.resolve("app.js", None);
        let second = resolver.resolve("app.js", None);
        assert_eq!(first, second);
        assert_eq!(first, Some(tmp.path().join("src/js/app.js")));
    }
}
