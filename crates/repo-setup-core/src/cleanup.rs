//! Removal of files that only matter to the template repository itself.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fsops;
use crate::layout::Layout;

/// Remove the template's packaging artifacts (manifest, lock file,
/// dependency directory, formatter ignore file).
///
/// Absent artifacts are skipped. Returns the artifacts actually removed.
pub fn remove_packaging_artifacts(root: &Path, layout: &Layout) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for artifact in &layout.packaging_artifacts {
        let path = root.join(artifact);
        if !fsops::exists(&path) {
            tracing::debug!("{} already absent", path.display());
            continue;
        }
        if fsops::tolerate(fsops::remove_path(&path))? {
            tracing::info!("removed {}", path.display());
            removed.push(artifact.clone());
        }
    }
    Ok(removed)
}

/// Delete the setup script. Returns whether it was there to delete.
pub fn remove_setup_script(root: &Path, layout: &Layout) -> Result<bool> {
    fsops::tolerate(fsops::remove_path(&root.join(&layout.setup_script)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_remove_packaging_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("node_modules/left-pad")).unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();

        let removed = remove_packaging_artifacts(dir.path(), &Layout::default()).unwrap();

        assert_eq!(
            removed,
            vec![PathBuf::from("package.json"), PathBuf::from("node_modules")]
        );
        assert!(!dir.path().join("node_modules").exists());
        assert!(dir.path().join("Cargo.toml").exists());
    }

    #[test]
    fn test_remove_packaging_artifacts_none_present() {
        let dir = tempfile::tempdir().unwrap();
        let removed = remove_packaging_artifacts(dir.path(), &Layout::default()).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_remove_setup_script() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setup.js"), "").unwrap();
        assert!(remove_setup_script(dir.path(), &Layout::default()).unwrap());
        assert!(!dir.path().join("setup.js").exists());
        assert!(!remove_setup_script(dir.path(), &Layout::default()).unwrap());
    }
}
