//! Placeholder substitution for template files.
//!
//! Template files carry literal, case-sensitive markers such as
//! `{{PROJECT_NAME}}`. There is no template language: no conditionals, no
//! loops, no escaping. Each marker in [`tokens::Token`] is swapped for the
//! matching [`ProjectInfo`](crate::project::ProjectInfo) value by the
//! [`renderer`], one line at a time.
//!
//! ## Markers
//!
//! | Marker                          | Value                   |
//! |---------------------------------|-------------------------|
//! | `{{REPOSITORY}}`                | `username/repository`   |
//! | `{{PROJECT_NAME}}`              | project name            |
//! | `{{PROJECT_SHORT_DESCRIPTION}}` | short description       |
//! | `{{PROJECT_LONG_DESCRIPTION}}`  | long description        |
//! | `{{DOCS_URL}}`                  | documentation URL       |
//! | `{{EMAIL}}`                     | email                   |
//! | `{{USERNAME}}`                  | GitHub username         |
//! | `{{NAME}}`                      | author name             |
//!
//! Static blocks appended to repository files (not templates themselves) are
//! embedded from the top-level `templates/` directory in [`embedded`].

pub mod embedded;
pub mod renderer;
pub mod tokens;
