//! File layout of a template repository.
//!
//! Every path the setup touches is named here, relative to the project root
//! (or to the template root where noted). The defaults describe the standard
//! template repository; a JSON file passed with `--layout` can override any
//! subset of fields.
//!
//! ```text
//! <root>/
//! ├── setup.js, package.json, ...      # removed by cleanup
//! └── template/                        # template root
//!     ├── .templatesyncignore
//!     ├── README.md, src/, ...         # moved into <root>
//!     └── .github/                     # replaces <root>/.github
//!         ├── CODEOWNERS
//!         ├── settings.yml
//!         └── workflows/template-sync.yml
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};

/// Paths and markers used by the setup steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Template root, relative to the project root.
    pub template_dir: PathBuf,
    /// Hidden configuration directory, relative to both roots.
    pub config_dir: PathBuf,
    /// Ownership-declaration file, relative to the template root.
    pub ownership_file: PathBuf,
    /// Prefix written before the username on the ownership line.
    pub ownership_marker: String,
    /// Sync-ignore file, relative to either root.
    pub sync_ignore_file: PathBuf,
    /// Repository settings file, relative to the project root.
    pub settings_file: PathBuf,
    /// Template-sync workflow, relative to the project root.
    pub sync_workflow_file: PathBuf,
    /// Packaging leftovers of the template repository itself.
    pub packaging_artifacts: Vec<PathBuf>,
    /// The setup script shipped with the template.
    pub setup_script: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            template_dir: "template".into(),
            config_dir: ".github".into(),
            ownership_file: ".github/CODEOWNERS".into(),
            ownership_marker: "* @".into(),
            sync_ignore_file: ".templatesyncignore".into(),
            settings_file: ".github/settings.yml".into(),
            sync_workflow_file: ".github/workflows/template-sync.yml".into(),
            packaging_artifacts: vec![
                "package.json".into(),
                "package-lock.json".into(),
                "node_modules".into(),
                ".prettierignore".into(),
            ],
            setup_script: "setup.js".into(),
        }
    }
}

impl Layout {
    /// Load a layout from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SetupError::LayoutNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| SetupError::LayoutParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the layout as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| SetupError::LayoutParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| SetupError::fs("write", path, e))
    }

    pub fn template_root(&self, root: &Path) -> PathBuf {
        root.join(&self.template_dir)
    }
}
