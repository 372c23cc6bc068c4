use common::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative: PathBuf,
}

impl SourceFile {
    pub fn destination(&self, output_root: &Path, suffix: &str, output_suffix: &str) -> PathBuf {
        let relative = self.relative.to_string_lossy();
        let stem = relative.strip_suffix(suffix).unwrap_or(&relative);
        output_root.join(format!("{}{}", stem, output_suffix))
    }
}

pub struct TreeWalker {
    root: PathBuf,
    suffix: String,
}

impl TreeWalker {
    pub fn new(root: &Path, suffix: &str) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::DirectoryNotFound(root.to_path_buf()));
        }
        let root = root
            .canonicalize()
            .map_err(|_| Error::DirectoryNotFound(root.to_path_buf()))?;

        Ok(Self {
            root,
            suffix: suffix.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> impl Iterator<Item = SourceFile> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(is_source_candidate)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(&self.suffix))
            .filter_map(|entry| {
                let path = entry.into_path();
                let relative = path.strip_prefix(&self.root).ok()?.to_path_buf();
                Some(SourceFile { path, relative })
            })
    }
}

// Symlinks count when they resolve to a file or resolve to nothing at all;
// a dangling link surfaces later as an open failure.
fn is_source_candidate(entry: &walkdir::DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    if !entry.path_is_symlink() {
        return false;
    }
    match fs::metadata(entry.path()) {
        Ok(target) => target.is_file(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}\n").unwrap();
    }

    #[test]
    fn test_recursive_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.jsonl");
        touch(dir.path(), "a.jsonl");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "2023/01/c.jsonl");
        touch(dir.path(), "2023/01/c.jsonl.bak");

        let walker = TreeWalker::new(dir.path(), ".jsonl").unwrap();
        let relative: Vec<PathBuf> = walker.files().map(|f| f.relative).collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("2023/01/c.jsonl"),
                PathBuf::from("a.jsonl"),
                PathBuf::from("b.jsonl"),
            ]
        );
        assert!(walker.files().all(|f| f.path.is_absolute()));
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        match TreeWalker::new(&missing, ".jsonl") {
            Err(Error::DirectoryNotFound(path)) => assert_eq!(path, missing),
            other => panic!("Expected DirectoryNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_empty_root_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let walker = TreeWalker::new(dir.path(), ".jsonl").unwrap();
        assert_eq!(walker.files().count(), 0);
    }

    #[test]
    fn test_destination_swaps_suffix() {
        let file = SourceFile {
            path: PathBuf::from("/in/2023/1/stream.jsonl"),
            relative: PathBuf::from("2023/1/stream.jsonl"),
        };
        assert_eq!(
            file.destination(Path::new("/out"), ".jsonl", ".csv"),
            PathBuf::from("/out/2023/1/stream.csv")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_to_directories_are_not_sources() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "real/a.jsonl");
        symlink(dir.path().join("real"), dir.path().join("d.jsonl")).unwrap();
        symlink(dir.path().join("real/a.jsonl"), dir.path().join("linked.jsonl")).unwrap();
        symlink(dir.path().join("gone"), dir.path().join("dangling.jsonl")).unwrap();

        let walker = TreeWalker::new(dir.path(), ".jsonl").unwrap();
        let relative: Vec<PathBuf> = walker.files().map(|f| f.relative).collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("dangling.jsonl"),
                PathBuf::from("linked.jsonl"),
                PathBuf::from("real/a.jsonl"),
            ]
        );
    }
}
