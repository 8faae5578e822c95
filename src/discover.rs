//! Locating candidate source files.

use std::collections::HashSet;
use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// The file the merge result is written to.
#[derive(Debug, Clone)]
pub struct Target {
    pub path: PathBuf,
    /// Permissions of the existing file; `None` when it does not exist yet.
    pub permissions: Option<Permissions>,
}

impl Target {
    pub fn probe(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let permissions = fs::metadata(&path).ok().map(|meta| meta.permissions());
        Self { path, permissions }
    }

    pub fn exists(&self) -> bool {
        self.permissions.is_some()
    }
}

/// Candidate sources in merge order.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// De-duplicated sources, never including the target.
    pub sources: Vec<PathBuf>,
    pub target: Target,
}

/// Collects candidate files.
///
/// Directories are walked recursively first (in argument order, entries
/// sorted by file name), followed by explicit files that exist. Paths that
/// resolve to the same file are kept once, at their first position. The
/// target is excluded from `sources`; callers process it last.
pub fn discover(directories: &[PathBuf], files: &[PathBuf], target: &Path) -> Discovery {
    let target = Target::probe(target);

    let mut seen = HashSet::new();
    seen.insert(identity(&target.path));

    let walked = directories.iter().flat_map(|dir| files_in_directory(dir));
    let explicit = files.iter().filter(|path| {
        let exists = path.exists();
        if !exists {
            warn!(path = %path.display(), "skipping file: does not exist");
        }
        exists
    });

    let mut sources = Vec::new();
    for path in walked.chain(explicit.cloned()) {
        if seen.insert(identity(&path)) {
            sources.push(path);
        } else {
            debug!(path = %path.display(), "ignoring duplicate path");
        }
    }

    Discovery { sources, target }
}

/// Recursively lists every non-directory entry under `dir`.
///
/// Unreadable entries are logged and skipped.
pub fn files_in_directory(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        match entry {
            Ok(entry) if !entry.file_type().is_dir() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!(dir = %dir.display(), error = %e, "cannot traverse directory entry"),
        }
    }

    files
}

/// Key used for path de-duplication.
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without the prefix, or when no home directory is known, are
/// returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "apiVersion: v1\n").unwrap();
    }

    #[test]
    fn test_files_in_directory_is_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.yaml"));
        touch(&dir.path().join("a.yaml"));
        touch(&dir.path().join("nested/c.yaml"));

        let files = files_in_directory(dir.path());

        assert_eq!(
            files,
            vec![
                dir.path().join("a.yaml"),
                dir.path().join("b.yaml"),
                dir.path().join("nested/c.yaml"),
            ]
        );
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        assert!(files_in_directory(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn test_discover_orders_directories_then_files() {
        let dir = tempdir().unwrap();
        let walked = dir.path().join("configs/a.yaml");
        let explicit = dir.path().join("extra.yaml");
        touch(&walked);
        touch(&explicit);

        let discovery = discover(
            &[dir.path().join("configs")],
            &[explicit.clone()],
            &dir.path().join("target"),
        );

        assert_eq!(discovery.sources, vec![walked, explicit]);
        assert!(!discovery.target.exists());
    }

    #[test]
    fn test_discover_drops_missing_explicit_files() {
        let dir = tempdir().unwrap();

        let discovery = discover(
            &[],
            &[dir.path().join("nope.yaml")],
            &dir.path().join("target"),
        );

        assert!(discovery.sources.is_empty());
    }

    #[test]
    fn test_discover_deduplicates_equivalent_paths() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("configs/a.yaml");
        touch(&file);
        let dotted = dir.path().join("configs/./a.yaml");

        let discovery = discover(
            &[dir.path().join("configs")],
            &[file.clone(), dotted],
            &dir.path().join("target"),
        );

        assert_eq!(discovery.sources, vec![file]);
    }

    #[test]
    fn test_target_is_processed_once_and_last() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("configs/config");
        let other = dir.path().join("configs/zz.yaml");
        touch(&target);
        touch(&other);

        let discovery = discover(&[dir.path().join("configs")], &[target.clone()], &target);

        assert_eq!(discovery.sources, vec![other]);
        assert!(discovery.target.exists());
        assert_eq!(discovery.target.path, target);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/etc/kube"), PathBuf::from("/etc/kube"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.kube/config"), home.join(".kube/config"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
