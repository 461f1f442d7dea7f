//! Command implementations for repo-setup.

pub mod setup;
