use std::path::Path;

use tracing::{debug, warn};

use crate::video::{storage::StorageRoots, types::ResolvedPath};

/// Maps extracted path strings to files on disk.
///
/// Per path, the first match wins: the path itself when absolute, then the
/// output root, then the input root, then the host's annotated-name lookup.
pub struct PathResolver<'a> {
    storage: &'a dyn StorageRoots,
}

impl<'a> PathResolver<'a> {
    pub fn new(storage: &'a dyn StorageRoots) -> Self {
        Self { storage }
    }

    /// Resolve every path in order, skipping (and logging) the ones that match
    /// no root.
    pub fn resolve<S: AsRef<str>>(&self, paths: &[S]) -> Vec<ResolvedPath> {
        paths
            .iter()
            .filter_map(|path| self.resolve_one(path.as_ref()))
            .collect()
    }

    /// Resolve a single path
    pub fn resolve_one(&self, path: &str) -> Option<ResolvedPath> {
        if path.is_empty() {
            return None;
        }

        let raw = Path::new(path);
        if raw.is_absolute() && raw.is_file() {
            return Some(ResolvedPath::new(raw.to_path_buf()));
        }

        for (root_name, root) in [
            ("output", self.storage.output_dir()),
            ("input", self.storage.input_dir()),
        ] {
            match root {
                Ok(dir) => {
                    let candidate = dir.join(path);
                    if candidate.is_file() {
                        debug!("Resolved {} against {} directory", path, root_name);
                        return Some(ResolvedPath::new(candidate));
                    }
                }
                Err(e) => debug!("Skipping {} directory: {}", root_name, e),
            }
        }

        if let Some(candidate) = self.storage.annotated_filepath(path).filter(|p| p.is_file()) {
            return Some(ResolvedPath::new(candidate));
        }

        warn!("Skipping invalid or missing path: {}", path);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::storage::LocalStorage;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        root: TempDir,
        storage: LocalStorage,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempdir().unwrap();
            let storage = LocalStorage::new(
                root.path().join("output"),
                root.path().join("input"),
                root.path().join("temp"),
            );
            Self { root, storage }
        }

        fn touch(&self, relative: &str) -> PathBuf {
            let path = self.root.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"not really a video").unwrap();
            path
        }
    }

    #[test]
    fn test_absolute_path_used_as_is() {
        let fixture = Fixture::new();
        let absolute = fixture.touch("elsewhere/clip.mp4");

        let resolver = PathResolver::new(&fixture.storage);
        let resolved = resolver.resolve(&[absolute.to_string_lossy()]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].as_path(), absolute);
    }

    #[test]
    fn test_output_root_wins_over_input_root() {
        let fixture = Fixture::new();
        let in_output = fixture.touch("output/clip.mp4");
        fixture.touch("input/clip.mp4");
        let in_input = fixture.touch("input/only_input.mp4");

        let resolver = PathResolver::new(&fixture.storage);
        let resolved = resolver.resolve(&["clip.mp4", "only_input.mp4"]);

        assert_eq!(resolved[0].as_path(), in_output);
        assert_eq!(resolved[1].as_path(), in_input);
    }

    #[test]
    fn test_annotated_name() {
        let fixture = Fixture::new();
        let temp_file = fixture.touch("temp/preview.mp4");

        let resolver = PathResolver::new(&fixture.storage);
        let resolved = resolver.resolve(&["preview.mp4 [temp]"]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].as_path(), temp_file);
    }

    #[test]
    fn test_missing_and_directory_paths_are_dropped() {
        let fixture = Fixture::new();
        fixture.touch("input/a.mp4");
        fs::create_dir_all(fixture.root.path().join("input/folder.mp4")).unwrap();
        fixture.touch("input/b.mp4");

        let resolver = PathResolver::new(&fixture.storage);
        let resolved = resolver.resolve(&["a.mp4", "missing.mp4", "", "folder.mp4", "b.mp4"]);

        let names: Vec<_> = resolved
            .iter()
            .map(|p| p.as_path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4"]);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let fixture = Fixture::new();
        fixture.touch("output/x.mp4");
        fixture.touch("input/y.mp4");

        let resolver = PathResolver::new(&fixture.storage);
        let inputs = ["x.mp4", "nope.mp4", "y.mp4", "x.mp4"];

        let first = resolver.resolve(&inputs);
        let second = resolver.resolve(&inputs);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
