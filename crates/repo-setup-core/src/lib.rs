//! Core library for the repo-setup tool.
//!
//! Turns a freshly generated copy of a repository template into a real project:
//! collects project metadata through a [`project::Console`], rewrites the
//! placeholder tokens in every template file, moves the template tree into the
//! project root, and configures (or removes) the recurring template-sync workflow.
//!
//! The binary crate only sequences these steps and renders them on a terminal;
//! every filesystem effect lives here so it can be exercised against temp trees.

pub mod cleanup;
pub mod error;
pub mod fsops;
pub mod layout;
pub mod project;
pub mod reorganize;
pub mod sync;
pub mod templates;
