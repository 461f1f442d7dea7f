use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use repo_setup_core::cleanup;
use repo_setup_core::fsops;
use repo_setup_core::layout::Layout;
use repo_setup_core::project::{ask_yes_no, collect_project_info, Console};
use repo_setup_core::reorganize::{self, OwnerOutcome};
use repo_setup_core::sync;
use repo_setup_core::templates::renderer::StagingDir;

use crate::output;

const TOTAL_STEPS: u32 = 5;

/// Run the whole setup against the project at `root`.
///
/// Collects and confirms the project metadata, removes the template's own
/// packaging files, fills in every template file, records the code owner,
/// moves the template tree into place, and finally asks about template sync
/// and whether to keep the setup script. A declined confirmation returns
/// [`SetupError::Aborted`](repo_setup_core::error::SetupError::Aborted)
/// before anything on disk changes.
pub async fn run<C: Console + ?Sized>(
    console: &mut C,
    root: &Path,
    layout: &Layout,
) -> Result<()> {
    output::print_header("repo-setup");

    let info = collect_project_info(console, || {
        output::print_warning("Setup cancelled, nothing was changed");
    })?;
    let info = Arc::new(info);

    output::print_step(1, TOTAL_STEPS, "Removing template packaging files");
    for removed in cleanup::remove_packaging_artifacts(root, layout)? {
        output::print_key_value("Removed", &removed.display().to_string());
    }

    output::print_step(2, TOTAL_STEPS, "Filling in template files");
    let template_root = layout.template_root(root);
    let files = match reorganize::discover_templates(&template_root) {
        Ok(files) => files,
        Err(err) if err.is_benign() => {
            fsops::log_benign(&err);
            Vec::new()
        }
        Err(err) => return Err(err.into()),
    };

    let staging = StagingDir::create_in(root)?;
    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("  {bar:30} {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let report = reorganize::rewrite_all(files, staging.path(), Arc::clone(&info), |path| {
        bar.set_message(path.display().to_string());
        bar.inc(1);
    })
    .await;
    bar.finish_and_clear();
    let closed = staging.close();
    let report = report?;
    closed?;

    output::print_key_value("Rewritten", &report.rewritten.to_string());
    if report.skipped > 0 {
        output::print_key_value("Skipped (not text)", &report.skipped.to_string());
    }
    if report.missing > 0 {
        output::print_warning(&format!("{} file(s) disappeared before rewrite", report.missing));
    }

    output::print_step(3, TOTAL_STEPS, "Declaring code owner");
    match reorganize::declare_owner(&template_root, layout, &info.username)? {
        OwnerOutcome::Appended | OwnerOutcome::Relocated => {
            output::print_key_value("Owner", &format!("@{}", info.username));
        }
        OwnerOutcome::Missing => output::print_warning(&format!(
            "No {} found, skipping owner declaration",
            layout.ownership_file.display()
        )),
    }

    output::print_step(4, TOTAL_STEPS, "Moving template into place");
    let relocation = reorganize::relocate(root, layout)?;
    output::print_key_value("Moved", &relocation.moved.len().to_string());
    if relocation.config_dir_replaced {
        output::print_key_value("Replaced", &layout.config_dir.display().to_string());
    }

    output::print_step(5, TOTAL_STEPS, "Configuring template sync");
    if ask_yes_no(console, "Keep this project in sync with the upstream template?")? {
        sync::enable_sync(root, layout)?;
        output::print_success("Template sync enabled");
        println!();
        println!("  To let the sync workflow open pull requests:");
        output::print_bullet("create a token with `repo` and `workflow` scopes");
        output::print_bullet("store it as the TEMPLATE_SYNC_TOKEN repository secret");
        output::print_bullet(&format!(
            "review {} for files the sync must never touch",
            layout.sync_ignore_file.display()
        ));
        println!();
    } else {
        sync::disable_sync(root, layout)?;
        output::print_key_value("Removed", &layout.sync_workflow_file.display().to_string());
    }

    if !ask_yes_no(console, "Keep the setup script?")?
        && cleanup::remove_setup_script(root, layout)?
    {
        output::print_key_value("Removed", &layout.setup_script.display().to_string());
    }

    output::print_success(&format!(
        "Project '{}' is ready at {}",
        info.project_name,
        info.repository_slug()
    ));
    Ok(())
}
