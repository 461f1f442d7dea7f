//! Template-sync configuration.
//!
//! With sync enabled, the generated project keeps pulling changes from its
//! upstream template through a scheduled workflow. That needs an ignore list
//! for project-owned files and a label for the sync pull requests. With sync
//! disabled, the workflow and its ignore list are removed.
//!
//! Missing files are logged and skipped throughout.

use std::path::Path;

use crate::error::Result;
use crate::fsops;
use crate::layout::Layout;
use crate::templates::embedded::{SYNC_IGNORE_BLOCK, SYNC_LABEL_BLOCK};

/// Append the ignore rules and the sync label, then make sure the ignore file
/// sits in the project root.
///
/// The ignore file is looked up in the template root first (sync configured
/// before relocation) and then in the project root.
pub fn enable_sync(root: &Path, layout: &Layout) -> Result<()> {
    let in_template = layout.template_root(root).join(&layout.sync_ignore_file);
    let in_root = root.join(&layout.sync_ignore_file);
    let from_template = fsops::exists(&in_template);
    let ignore_file = if from_template { &in_template } else { &in_root };

    fsops::tolerate(fsops::append(ignore_file, SYNC_IGNORE_BLOCK))?;
    fsops::tolerate(fsops::append(
        &root.join(&layout.settings_file),
        SYNC_LABEL_BLOCK,
    ))?;

    if from_template {
        fsops::tolerate(fsops::replace_path(&in_template, &in_root))?;
    }

    tracing::info!("template sync enabled");
    Ok(())
}

/// Remove the sync workflow and the ignore file.
pub fn disable_sync(root: &Path, layout: &Layout) -> Result<()> {
    fsops::tolerate(fsops::remove_path(&root.join(&layout.sync_workflow_file)))?;
    fsops::tolerate(fsops::remove_path(&root.join(&layout.sync_ignore_file)))?;

    let in_template = layout.template_root(root).join(&layout.sync_ignore_file);
    if fsops::exists(&in_template) {
        fsops::remove_path(&in_template)?;
    }

    tracing::info!("template sync disabled");
    Ok(())
}
