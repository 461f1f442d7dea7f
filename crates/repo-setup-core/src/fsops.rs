//! Filesystem helpers shared by every setup step.
//!
//! Each helper attaches the attempted action and path to its error so a fatal
//! failure prints something actionable. [`tolerate`] implements the run-wide
//! policy: a missing target (or an already-existing create target) is logged
//! and skipped, anything else aborts the run.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};

/// Swallow benign absence, propagate everything else.
///
/// Returns `Ok(true)` if the operation ran, `Ok(false)` if it was skipped
/// because its target was missing (or already existed).
pub fn tolerate(result: Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_benign() => {
            log_benign(&err);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Log a tolerated error as a warning.
pub fn log_benign(err: &SetupError) {
    tracing::warn!("{}: {}", err, describe_kind(err));
}

fn describe_kind(err: &SetupError) -> &'static str {
    match err {
        SetupError::Fs { source, .. } if source.kind() == io::ErrorKind::AlreadyExists => {
            "already exists"
        }
        _ => "not found",
    }
}

/// Whether anything (file, directory or symlink) exists at `path`.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Remove a file or a whole directory tree.
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| SetupError::fs("remove", path, e))?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| SetupError::fs("remove", path, e))
}

/// Rename `src` to `dst`. Fails with a benign error if `src` is missing.
pub fn rename(src: &Path, dst: &Path) -> Result<()> {
    fs::rename(src, dst).map_err(|e| SetupError::fs("move", src, e))
}

/// Append `text` to `path`, creating the file (but not its parent) if needed.
pub fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SetupError::fs("open", path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| SetupError::fs("append to", path, e))
}

/// Append to `path` only if it already exists.
pub fn append_existing(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| SetupError::fs("open", path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| SetupError::fs("append to", path, e))
}

/// Move `src` to `dst`, replacing whatever is at `dst`.
///
/// The source is checked first, so a missing source never costs the existing
/// destination. An existing destination is renamed aside, the source is moved
/// into place, and only then is the old copy deleted. If the second rename
/// fails the old destination is restored.
pub fn replace_path(src: &Path, dst: &Path) -> Result<()> {
    fs::symlink_metadata(src).map_err(|e| SetupError::fs("move", src, e))?;

    if !exists(dst) {
        return rename(src, dst);
    }

    let backup = backup_path(dst);
    rename(dst, &backup)?;
    if let Err(err) = rename(src, dst) {
        if let Err(restore) = fs::rename(&backup, dst) {
            tracing::error!(
                "could not restore {} from {}: {restore}",
                dst.display(),
                backup.display()
            );
        }
        return Err(err);
    }
    remove_path(&backup)
}

/// Pick an unused sibling name for a displaced destination.
fn backup_path(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut n = 0u32;
    loop {
        let candidate = dst.with_file_name(format!(".{name}.setup-old-{n}"));
        if !exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
