//! Moving the template tree into the project root.
//!
//! The order is fixed:
//! 1. [`discover_templates`]: list every regular file under the template root.
//! 2. [`rewrite_all`]: substitute markers in all of them, as one awaited batch.
//! 3. [`declare_owner`]: record the operator as code owner.
//! 4. [`relocate`]: move the template's children into the project root and
//!    swap in the template's hidden configuration directory.
//!
//! Step 4 never starts while a rewrite is still in flight: `rewrite_all` only
//! returns once every spawned rewrite has settled.

use std::any::Any;
use std::collections::HashSet;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::error::{Result, SetupError};
use crate::fsops;
use crate::layout::Layout;
use crate::project::ProjectInfo;
use crate::templates::renderer::{rewrite_file, RewriteOutcome};

/// Per-batch rewrite counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteReport {
    pub rewritten: usize,
    /// Non-text files left untouched.
    pub skipped: usize,
    /// Files that vanished between discovery and rewrite.
    pub missing: usize,
}

/// How the ownership declaration was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerOutcome {
    /// The ownership line was appended to the nested file.
    Appended,
    /// A loose copy at the template root was moved into the nested location.
    Relocated,
    /// Neither file exists.
    Missing,
}

/// Result of [`relocate`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Names of the entries moved into the project root, in move order.
    pub moved: Vec<PathBuf>,
    /// Whether the hidden configuration directory was replaced.
    pub config_dir_replaced: bool,
}

/// List every regular file under `template_root`, sorted by path.
///
/// Directories are traversed but not returned; symlinks are not followed.
pub fn discover_templates(template_root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(template_root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| template_root.to_path_buf());
            SetupError::fs("walk", path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Rewrite every file in `files`, one blocking task per file.
///
/// Rewrites may finish in any order, but this returns only after all of them
/// have settled. A missing file is counted and skipped; the first fatal error
/// is returned once the batch has drained. `on_done` runs once per file.
pub async fn rewrite_all<F>(
    files: Vec<PathBuf>,
    staging_dir: &Path,
    info: Arc<ProjectInfo>,
    on_done: F,
) -> Result<RewriteReport>
where
    F: FnMut(&Path),
{
    let staging_dir = staging_dir.to_path_buf();
    settle_batch(
        files,
        move |path| rewrite_file(path, &staging_dir, &info),
        on_done,
    )
    .await
}

/// Run `op` on every path as a blocking task and wait for all of them.
///
/// A panicking `op` becomes [`SetupError::Task`] for its path.
async fn settle_batch<Op, F>(files: Vec<PathBuf>, op: Op, mut on_done: F) -> Result<RewriteReport>
where
    Op: Fn(&Path) -> Result<RewriteOutcome> + Send + Sync + 'static,
    F: FnMut(&Path),
{
    let op = Arc::new(op);
    let mut pending: HashSet<PathBuf> = files.iter().cloned().collect();
    let mut tasks = JoinSet::new();
    for path in files {
        let op = Arc::clone(&op);
        tasks.spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| op(&path)))
                .unwrap_or_else(|payload| {
                    Err(SetupError::Task(format!(
                        "rewrite of {} panicked: {}",
                        path.display(),
                        panic_message(&*payload)
                    )))
                });
            (path, result)
        });
    }

    let mut report = RewriteReport::default();
    let mut first_fatal: Option<SetupError> = None;

    while let Some(joined) = tasks.join_next().await {
        let (path, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                // Only cancellation gets here; its path is settled below.
                if first_fatal.is_none() {
                    first_fatal = Some(SetupError::Task(e.to_string()));
                }
                continue;
            }
        };
        pending.remove(&path);

        match result {
            Ok(RewriteOutcome::Rewritten { .. }) => report.rewritten += 1,
            Ok(RewriteOutcome::SkippedBinary) => report.skipped += 1,
            Err(err) if err.is_benign() => {
                fsops::log_benign(&err);
                report.missing += 1;
            }
            Err(err) => {
                tracing::error!("{err}");
                if first_fatal.is_none() {
                    first_fatal = Some(err);
                }
            }
        }
        on_done(&path);
    }

    for path in &pending {
        on_done(path);
    }

    match first_fatal {
        Some(err) => Err(err),
        None => Ok(report),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Record `username` as owner in the template's ownership file.
///
/// Appends `<marker><username>` to the nested file. If the nested file does
/// not exist, a copy with the same name at the template root is moved there
/// instead, untouched.
pub fn declare_owner(
    template_root: &Path,
    layout: &Layout,
    username: &str,
) -> Result<OwnerOutcome> {
    let nested = template_root.join(&layout.ownership_file);
    if fsops::exists(&nested) {
        let line = format!("{}{}\n", layout.ownership_marker, username);
        fsops::append_existing(&nested, &line)?;
        tracing::info!("declared owner in {}", nested.display());
        return Ok(OwnerOutcome::Appended);
    }

    let Some(file_name) = layout.ownership_file.file_name() else {
        return Ok(OwnerOutcome::Missing);
    };
    let loose = template_root.join(file_name);
    if !fsops::exists(&loose) {
        fsops::log_benign(&SetupError::fs(
            "find",
            &nested,
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
        return Ok(OwnerOutcome::Missing);
    }

    if let Some(parent) = nested.parent() {
        fs::create_dir_all(parent).map_err(|e| SetupError::fs("create", parent, e))?;
    }
    fsops::rename(&loose, &nested)?;
    tracing::info!("moved {} to {}", loose.display(), nested.display());
    Ok(OwnerOutcome::Relocated)
}

/// Move the template tree into the project root.
///
/// Every direct child of the template root except the hidden configuration
/// directory replaces the same-named entry in `root`. The configuration
/// directory is handled last and only if the template actually has one, so
/// the project's existing copy is never deleted without a replacement. The
/// emptied template root is removed at the end.
pub fn relocate(root: &Path, layout: &Layout) -> Result<Relocation> {
    let template_root = layout.template_root(root);
    let config_src = template_root.join(&layout.config_dir);
    let config_dst = root.join(&layout.config_dir);

    let entries = match fs::read_dir(&template_root) {
        Ok(entries) => entries,
        Err(e) => {
            let err = SetupError::fs("read", &template_root, e);
            if err.is_benign() {
                fsops::log_benign(&err);
                return Ok(Relocation::default());
            }
            return Err(err);
        }
    };
    let mut children = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| SetupError::fs("read", &template_root, e))?;
    children.sort();

    let mut relocation = Relocation::default();

    for child in children {
        if child == config_src {
            continue;
        }
        let Some(name) = child.file_name() else {
            continue;
        };
        let dst = root.join(name);
        if fsops::tolerate(fsops::replace_path(&child, &dst))? {
            tracing::info!("moved {} to {}", child.display(), dst.display());
            relocation.moved.push(PathBuf::from(name));
        }
    }

    if fsops::exists(&config_src) {
        fsops::replace_path(&config_src, &config_dst)?;
        tracing::info!("replaced {} with template copy", config_dst.display());
        relocation.config_dir_replaced = true;
    } else {
        tracing::warn!(
            "template has no {}, keeping the existing one",
            layout.config_dir.display()
        );
    }

    fsops::tolerate(
        fs::remove_dir(&template_root).map_err(|e| SetupError::fs("remove", &template_root, e)),
    )?;

    Ok(relocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::renderer::StagingDir;
    use crate::templates::tokens::Token;

    fn info() -> ProjectInfo {
        ProjectInfo {
            name: "Ada".into(),
            email: "ada@x.org".into(),
            username: "bob".into(),
            repository: "engine".into(),
            project_name: "Engine".into(),
            short_description: "Short".into(),
            long_description: "Long".into(),
            docs_url: "https://docs.x.org".into(),
        }
    }

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    /// A project root with a template tree and a stale `.github`.
    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let t = dir.path().join("template");
        write(&t.join("README.md"), "# {{PROJECT_NAME}}\n{{PROJECT_SHORT_DESCRIPTION}}\n");
        write(&t.join("src/lib.rs"), "//! {{PROJECT_LONG_DESCRIPTION}}\n");
        write(&t.join("docs/index.md"), "See {{DOCS_URL}} or {{REPOSITORY}}\n");
        write(&t.join(".github/CODEOWNERS"), "# owners\n");
        write(&t.join(".github/settings.yml"), "repository:\n  name: {{REPOSITORY}}\nlabels:\n");
        write(&t.join(".github/workflows/template-sync.yml"), "name: sync\n");
        write(&t.join(".templatesyncignore"), "# ignore\n");
        write(&dir.path().join(".github/old.yml"), "stale\n");
        write(&dir.path().join("README.md"), "template repo readme\n");
        dir
    }

    #[test]
    fn test_discover_only_files_sorted() {
        let dir = fixture();
        let files = discover_templates(&dir.path().join("template")).unwrap();
        assert_eq!(files.len(), 7);
        assert!(files.iter().all(|f| f.is_file()));
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        assert!(files[0].ends_with(".github/CODEOWNERS"));
    }

    #[test]
    fn test_discover_missing_root_is_benign() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_templates(&dir.path().join("template")).unwrap_err();
        assert!(err.is_benign());
    }

    #[tokio::test]
    async fn test_rewrite_all_awaits_every_file() {
        let dir = fixture();
        let files = discover_templates(&dir.path().join("template")).unwrap();
        let staging = StagingDir::create_in(dir.path()).unwrap();
        let mut seen = 0;

        let report = rewrite_all(files.clone(), staging.path(), Arc::new(info()), |_| seen += 1)
            .await
            .unwrap();
        staging.close().unwrap();

        assert_eq!(report.rewritten, 7);
        assert_eq!(seen, 7);
        for file in files {
            let text = fs::read_to_string(&file).unwrap();
            for token in Token::ALL {
                assert!(!text.contains(token.marker()));
            }
        }
        assert_eq!(
            fs::read_to_string(dir.path().join("template/docs/index.md")).unwrap(),
            "See https://docs.x.org or bob/engine\n"
        );
    }

    #[tokio::test]
    async fn test_rewrite_all_tolerates_missing_file() {
        let dir = fixture();
        let mut files = discover_templates(&dir.path().join("template")).unwrap();
        files.push(dir.path().join("template/vanished.md"));
        let staging = StagingDir::create_in(dir.path()).unwrap();

        let report = rewrite_all(files, staging.path(), Arc::new(info()), |_| {})
            .await
            .unwrap();

        assert_eq!(report.rewritten, 7);
        assert_eq!(report.missing, 1);
    }

    #[tokio::test]
    async fn test_rewrite_all_same_base_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for sub in ["a", "b", "c", "d"] {
            let path = dir.path().join(sub).join("README.md");
            write(&path, &format!("{sub} {{{{NAME}}}}\n"));
            files.push(path);
        }
        let staging = StagingDir::create_in(dir.path()).unwrap();

        rewrite_all(files, staging.path(), Arc::new(info()), |_| {})
            .await
            .unwrap();

        for sub in ["a", "b", "c", "d"] {
            let text = fs::read_to_string(dir.path().join(sub).join("README.md")).unwrap();
            assert_eq!(text, format!("{sub} Ada\n"));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rewrite_all_returns_fatal_error_after_batch() {
        let dir = fixture();
        let mut files = discover_templates(&dir.path().join("template")).unwrap();
        // A directory opens on unix but fails to read.
        files.insert(0, dir.path().join("template/src"));
        let total = files.len();
        let staging = StagingDir::create_in(dir.path()).unwrap();
        let mut seen = 0;

        let err = rewrite_all(files, staging.path(), Arc::new(info()), |_| seen += 1)
            .await
            .unwrap_err();

        assert!(!err.is_benign());
        assert!(matches!(err, SetupError::Fs { action: "read", .. }));
        assert_eq!(seen, total);
        assert_eq!(
            fs::read_to_string(dir.path().join("template/docs/index.md")).unwrap(),
            "See https://docs.x.org or bob/engine\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rewrite_all_read_only_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = fixture();
        let t = dir.path().join("template");
        let files = discover_templates(&t).unwrap();
        let staging = StagingDir::create_in(dir.path()).unwrap();
        let locked = t.join("docs");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        if fs::write(locked.join(".write-check"), "").is_ok() {
            // Permissions are not enforced (running as root).
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = rewrite_all(files, staging.path(), Arc::new(info()), |_| {}).await;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(!err.is_benign());
        assert_eq!(
            fs::read_to_string(t.join("docs/index.md")).unwrap(),
            "See {{DOCS_URL}} or {{REPOSITORY}}\n"
        );
        assert_eq!(fs::read_to_string(t.join("src/lib.rs")).unwrap(), "//! Long\n");
    }

    #[tokio::test]
    async fn test_settle_batch_reports_panics() {
        let files = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")];
        let mut seen = Vec::new();

        let err = settle_batch(
            files,
            |path| {
                if path == Path::new("b") {
                    panic!("boom");
                }
                Ok(RewriteOutcome::Rewritten { lines: 1 })
            },
            |path| seen.push(path.to_path_buf()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SetupError::Task(ref msg) if msg.contains("boom")));
        seen.sort();
        assert_eq!(
            seen,
            vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
        );
    }

    #[test]
    fn test_declare_owner_appends() {
        let dir = fixture();
        let t = dir.path().join("template");
        let outcome = declare_owner(&t, &Layout::default(), "bob").unwrap();
        assert_eq!(outcome, OwnerOutcome::Appended);
        assert_eq!(
            fs::read_to_string(t.join(".github/CODEOWNERS")).unwrap(),
            "# owners\n* @bob\n"
        );
    }

    #[test]
    fn test_declare_owner_relocates_loose_copy() {
        let dir = tempfile::tempdir().unwrap();
        let t = dir.path().join("template");
        write(&t.join("CODEOWNERS"), "* @bob\n");

        let outcome = declare_owner(&t, &Layout::default(), "bob").unwrap();

        assert_eq!(outcome, OwnerOutcome::Relocated);
        assert!(!t.join("CODEOWNERS").exists());
        assert_eq!(
            fs::read_to_string(t.join(".github/CODEOWNERS")).unwrap(),
            "* @bob\n"
        );
    }

    #[test]
    fn test_declare_owner_missing() {
        let dir = tempfile::tempdir().unwrap();
        let t = dir.path().join("template");
        fs::create_dir_all(&t).unwrap();
        let outcome = declare_owner(&t, &Layout::default(), "bob").unwrap();
        assert_eq!(outcome, OwnerOutcome::Missing);
        assert!(!t.join(".github").exists());
    }

    #[test]
    fn test_relocate_moves_tree_and_config_dir() {
        let dir = fixture();
        let root = dir.path();

        let relocation = relocate(root, &Layout::default()).unwrap();

        assert!(relocation.config_dir_replaced);
        assert_eq!(
            relocation.moved,
            vec![
                PathBuf::from(".templatesyncignore"),
                PathBuf::from("README.md"),
                PathBuf::from("docs"),
                PathBuf::from("src"),
            ]
        );
        assert!(!root.join("template").exists());
        assert_eq!(
            fs::read_to_string(root.join("README.md")).unwrap(),
            "# {{PROJECT_NAME}}\n{{PROJECT_SHORT_DESCRIPTION}}\n"
        );
        assert!(root.join("src/lib.rs").is_file());
        assert!(root.join(".github/CODEOWNERS").is_file());
        assert!(root.join(".github/workflows/template-sync.yml").is_file());
        assert!(!root.join(".github/old.yml").exists());
    }

    #[test]
    fn test_relocate_without_template_config_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("template/LICENSE"), "MIT\n");
        write(&root.join(".github/keep.yml"), "keep\n");

        let relocation = relocate(root, &Layout::default()).unwrap();

        assert!(!relocation.config_dir_replaced);
        assert!(root.join("LICENSE").is_file());
        assert!(root.join(".github/keep.yml").is_file());
        assert!(!root.join("template").exists());
    }

    #[test]
    fn test_relocate_missing_template_root() {
        let dir = tempfile::tempdir().unwrap();
        let relocation = relocate(dir.path(), &Layout::default()).unwrap();
        assert_eq!(relocation, Relocation::default());
    }
}
