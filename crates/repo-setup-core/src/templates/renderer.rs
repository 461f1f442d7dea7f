//! Line-by-line token substitution with atomic file replacement.
//!
//! A file is never rewritten in place. Its lines are streamed into a uniquely
//! named staging file inside a [`StagingDir`], and the finished staging file is
//! renamed over the original. Readers see either the old content or the new
//! content, never a truncated mix.
//!
//! The staging directory is created inside the project root rather than the
//! system temp dir so the final rename never crosses filesystems.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::tokens::Token;
use crate::error::{Result, SetupError};
use crate::project::ProjectInfo;

/// What happened to a single template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The file was rewritten; `lines` is the number of lines written.
    Rewritten { lines: usize },
    /// The file holds NUL bytes and no markers, and was left untouched.
    SkippedBinary,
}

/// Replace every recognized marker in `line`.
///
/// Scans left to right. Text inserted for a marker is not scanned again, so a
/// value that itself looks like a marker is written out literally.
pub fn substitute_line(line: &str, info: &ProjectInfo) -> String {
    let mut out = Vec::with_capacity(line.len());
    substitute_bytes(line.as_bytes(), info, &mut out);
    // Only whole UTF-8 values are spliced between UTF-8 runs of `line`.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Byte-level form of [`substitute_line`], appending to `out`.
///
/// Markers are ASCII, so lines in any ASCII-compatible encoding (Latin-1,
/// Windows-1252, ...) are substituted and every other byte passes through.
/// Returns whether any marker was replaced.
pub fn substitute_bytes(line: &[u8], info: &ProjectInfo, out: &mut Vec<u8>) -> bool {
    let open = Token::OPEN.as_bytes();
    let mut replaced = false;
    let mut rest = line;

    while let Some(pos) = find(rest, open) {
        out.extend_from_slice(&rest[..pos]);
        let candidate = &rest[pos..];
        match Token::at_start_of(candidate) {
            Some(token) => {
                out.extend_from_slice(token.value(info).as_bytes());
                rest = &candidate[token.marker().len()..];
                replaced = true;
            }
            None => {
                // Step over a single brace so `{{{NAME}}` still matches at +1.
                out.push(b'{');
                rest = &candidate[1..];
            }
        }
    }

    out.extend_from_slice(rest);
    replaced
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Strip a trailing `\n` and an optional `\r` before it.
fn trim_line_end(mut line: &[u8]) -> &[u8] {
    if let Some(stripped) = line.strip_suffix(b"\n") {
        line = stripped;
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
    }
    line
}

/// Rewrite `path` in place, substituting every marker on every line.
///
/// Output lines always end in `\n`; the line count is preserved. The original
/// file permissions are carried over to the replacement. A file with NUL bytes
/// and no markers is treated as binary and left alone.
pub fn rewrite_file(
    path: &Path,
    staging_dir: &Path,
    info: &ProjectInfo,
) -> Result<RewriteOutcome> {
    let source = File::open(path).map_err(|e| SetupError::fs("open", path, e))?;
    let permissions = source
        .metadata()
        .map_err(|e| SetupError::fs("stat", path, e))?
        .permissions();

    let base_name = path.file_name().ok_or_else(|| {
        SetupError::fs(
            "rewrite",
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    let mut staged = tempfile::Builder::new()
        .prefix(base_name)
        .tempfile_in(staging_dir)
        .map_err(|e| SetupError::fs("create staging file in", staging_dir, e))?;

    let mut lines = 0usize;
    let mut saw_nul = false;
    let mut saw_marker = false;
    {
        let mut reader = BufReader::new(source);
        let mut writer = BufWriter::new(staged.as_file_mut());
        let mut raw = Vec::new();
        let mut out = Vec::new();
        loop {
            raw.clear();
            let read = reader
                .read_until(b'\n', &mut raw)
                .map_err(|e| SetupError::fs("read", path, e))?;
            if read == 0 {
                break;
            }
            let line = trim_line_end(&raw);
            saw_nul |= line.contains(&0);

            out.clear();
            saw_marker |= substitute_bytes(line, info, &mut out);
            out.push(b'\n');
            writer
                .write_all(&out)
                .map_err(|e| SetupError::fs("write staging copy of", path, e))?;
            lines += 1;
        }
        writer
            .flush()
            .map_err(|e| SetupError::fs("write staging copy of", path, e))?;
    }

    if saw_nul && !saw_marker {
        tracing::debug!("skipping binary file {}", path.display());
        return Ok(RewriteOutcome::SkippedBinary);
    }

    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(|e| SetupError::fs("set permissions on staging copy of", path, e))?;
    staged
        .persist(path)
        .map_err(|e| SetupError::fs("replace", path, e.error))?;

    tracing::debug!("rewrote {} ({lines} lines)", path.display());
    Ok(RewriteOutcome::Rewritten { lines })
}

/// A uniquely named directory holding in-progress rewrites.
///
/// Removed on [`close`](StagingDir::close), or on drop as a fallback.
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create a fresh staging directory under `parent`.
    pub fn create_in(parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(".repo-setup-staging-")
            .tempdir_in(parent)
            .map_err(|e| SetupError::fs("create staging directory in", parent, e))?;
        tracing::debug!("staging directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the staging directory, reporting failures.
    pub fn close(self) -> Result<()> {
        let path: PathBuf = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| SetupError::fs("remove staging directory", path, e))
    }
}
