//! Run configuration: command-line flags merged over an optional JSON
//! project file.
//!
//! ```json
//! {
//!   "libraries": ["bin/*.dll"],
//!   "output": "docs/stdlib.md",
//!   "format": "markdown",
//!   "baseUrl": "/stdlib",
//!   "typesMap": "map.json",
//!   "markers": { "class": "ScriptEngine.Machine.Contexts.ContextClassAttribute" }
//! }
//! ```
//!
//! Relative paths in the project file are taken from the file's directory.

use crate::metadata::catalog::{MarkerCatalog, Role};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FORMAT: &str = "markdown";
pub const DEFAULT_TYPES_MAP: &str = "map.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub libraries: Vec<String>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub base_url: Option<String>,
    pub types_map: Option<PathBuf>,
    /// Marker type overrides keyed by role, e.g. `"global-context"`.
    #[serde(default)]
    pub markers: BTreeMap<Role, String>,
}

impl ProjectFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read project file {}", path.display()))?;
        let mut project: ProjectFile = serde_json::from_str(&data)
            .with_context(|| format!("invalid project file {}", path.display()))?;
        if let Some(base) = path.parent() {
            project.rebase(base);
        }
        Ok(project)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &str| -> String {
            if Path::new(p).is_absolute() {
                p.to_string()
            } else {
                base.join(p).to_string_lossy().into_owned()
            }
        };
        self.libraries = self.libraries.iter().map(|p| join(p)).collect();
        self.output = self.output.take().map(|p| base.join(p));
        self.types_map = self.types_map.take().map(|p| base.join(p));
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Default)]
pub struct Overrides {
    pub libraries: Vec<String>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub base_url: Option<String>,
    pub types_map: Option<PathBuf>,
    pub no_types_map: bool,
}

/// Effective settings of one run.
#[derive(Debug)]
pub struct Config {
    pub libraries: Vec<String>,
    /// `None` writes to stdout.
    pub output: Option<PathBuf>,
    pub format: String,
    pub base_url: String,
    /// `None` disables loading and saving the type dictionary.
    pub types_map: Option<PathBuf>,
    pub catalog: MarkerCatalog,
}

impl Config {
    /// Command-line values win; libraries given on the command line replace
    /// the project's list.
    pub fn resolve(project: Option<ProjectFile>, cli: Overrides) -> Config {
        let project = project.unwrap_or_default();
        let libraries = if cli.libraries.is_empty() {
            project.libraries
        } else {
            cli.libraries
        };
        let types_map = if cli.no_types_map {
            None
        } else {
            Some(
                cli.types_map
                    .or(project.types_map)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TYPES_MAP)),
            )
        };
        Config {
            libraries,
            output: cli.output.or(project.output),
            format: cli
                .format
                .or(project.format)
                .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            base_url: cli.base_url.or(project.base_url).unwrap_or_default(),
            types_map,
            catalog: MarkerCatalog::default().with_overrides(&project.markers),
        }
    }
}
