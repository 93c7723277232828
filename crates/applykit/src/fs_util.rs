//! Filesystem helpers shared by mutation kinds.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy `src` into `dest`, overwriting files that already
/// exist. Directories are created as needed; entries that vanish
/// mid-walk are skipped rather than failing the whole copy.
///
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(src).into_iter().filter_map(|e| e.ok()) {
        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            if fs::copy(entry.path(), &target).is_ok() {
                copied += 1;
            }
        }
        // Symlinks and special files in the bundle are ignored.
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_tree_recurses() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("icons/scalable")).unwrap();
        fs::write(src.path().join("index.theme"), "[Icon Theme]").unwrap();
        fs::write(src.path().join("icons/scalable/app.svg"), "<svg/>").unwrap();

        let dest = tempfile::tempdir().unwrap();
        let copied = copy_tree(src.path(), &dest.path().join("out")).unwrap();

        assert_eq!(copied, 2);
        assert!(dest.path().join("out/index.theme").is_file());
        assert!(dest.path().join("out/icons/scalable/app.svg").is_file());
    }

    #[test]
    fn test_copy_tree_overwrites_existing() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("settings.ini"), "new").unwrap();

        let dest = tempfile::tempdir().unwrap();
        fs::write(dest.path().join("settings.ini"), "old").unwrap();

        copy_tree(src.path(), dest.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dest.path().join("settings.ini")).unwrap(),
            "new"
        );
    }
}
