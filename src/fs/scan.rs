//! Directory enumeration used to populate the case cache

use crate::error::{Error, Result};
use crate::path::SEPARATOR;
use std::fs;
use std::path::PathBuf;

/// Lists the plaintext entry names of a virtual directory in their true case
pub trait DirectoryScanner: Send + Sync {
    fn list(&self, dir: &str) -> Result<Vec<String>>;
}

/// Scanner over a host directory tree whose names are stored in plaintext
pub struct FsDirectoryScanner {
    /// Root path of the tree
    root: PathBuf,
}

impl FsDirectoryScanner {
    /// Create a scanner rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Scan(format!(
                "root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Resolve a virtual directory to its host path
    pub fn resolve(&self, dir: &str) -> PathBuf {
        dir.split(SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl DirectoryScanner for FsDirectoryScanner {
    fn list(&self, dir: &str) -> Result<Vec<String>> {
        let resolved = self.resolve(dir);
        let mut names = Vec::new();

        for entry in fs::read_dir(&resolved)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    return Err(Error::Scan(format!(
                        "non UTF-8 entry {:?} in {}",
                        raw,
                        resolved.display()
                    )))
                }
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_root_and_subdir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Report.txt"), b"1").unwrap();
        fs::create_dir(dir.path().join("Docs")).unwrap();
        fs::write(dir.path().join("Docs").join("Notes.md"), b"2").unwrap();

        let scanner = FsDirectoryScanner::new(dir.path()).unwrap();

        let mut root = scanner.list("\\").unwrap();
        root.sort();
        assert_eq!(root, vec!["Docs".to_string(), "Report.txt".to_string()]);

        let docs = scanner.list("\\Docs").unwrap();
        assert_eq!(docs, vec!["Notes.md".to_string()]);
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let scanner = FsDirectoryScanner::new(dir.path()).unwrap();
        assert!(scanner.list("\\nope").is_err());
    }

    #[test]
    fn test_root_must_exist() {
        let dir = tempdir().unwrap();
        assert!(FsDirectoryScanner::new(dir.path().join("absent")).is_err());
    }
}
