//! Compile-time embedded text blocks for the sync configuration.
//!
//! Each constant loads a file from `templates/sync/` via [`include_str!`]. The
//! paths are relative to this source file
//! (`crates/repo-setup-core/src/templates/embedded.rs`).
//!
//! Do NOT move the block files without updating the paths here.

/// Appended to the sync-ignore file when template sync is enabled.
pub const SYNC_IGNORE_BLOCK: &str =
    include_str!("../../../../templates/sync/templatesyncignore.block");

/// Appended to the repository settings file when template sync is enabled.
pub const SYNC_LABEL_BLOCK: &str =
    include_str!("../../../../templates/sync/settings-label.block");
