//! Metadata provider backed by a JSON dump.
//!
//! An external introspector writes `<Lib>.meta.json` next to `<Lib>.dll`:
//!
//! ```json
//! {
//!   "name": "Acme.Lib",
//!   "references": ["ScriptEngine", "System.Core"],
//!   "types": [{ "fullName": "Acme.Lib.Widget", "name": "Widget", "attributes": [] }]
//! }
//! ```

use super::catalog::MarkerCatalog;
use super::{MetadataProvider, TypeInfo};
use crate::error::{DocError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DUMP_SUFFIX: &str = ".meta.json";
const LIBRARY_SUFFIX: &str = ".dll";

#[derive(Debug, Deserialize)]
struct Dump {
    #[serde(default)]
    name: String,
    #[serde(default)]
    references: Vec<String>,
    #[serde(default)]
    types: Vec<TypeInfo>,
}

/// One library loaded from its metadata dump.
#[derive(Debug)]
pub struct DumpProvider {
    name: String,
    dir: PathBuf,
    stem: String,
    references: Vec<String>,
    types: Vec<TypeInfo>,
    catalog: MarkerCatalog,
}

/// `dir/Acme.Lib.dll` or `dir/Acme.Lib.meta.json` → `Acme.Lib`.
pub fn library_stem(input: &Path) -> Option<String> {
    let file_name = input.file_name()?.to_str()?;
    let stem = file_name
        .strip_suffix(DUMP_SUFFIX)
        .or_else(|| input.file_stem().and_then(|s| s.to_str()))?;
    Some(stem.to_string())
}

/// Whether a path names a library input this tool can open.
pub fn is_library_input(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|p| p.ends_with(DUMP_SUFFIX) || p.ends_with(LIBRARY_SUFFIX))
}

/// References the runtime supplies; they never need a file next to the library.
fn is_runtime_provided(reference: &str) -> bool {
    reference == "mscorlib"
        || reference == "netstandard"
        || reference.starts_with("System")
        || reference.starts_with("Microsoft.")
}

impl DumpProvider {
    pub fn open(input: &Path, catalog: MarkerCatalog) -> Result<Self> {
        let stem = library_stem(input).ok_or_else(|| DocError::Load {
            library: input.display().to_string(),
            reason: "not a library path".to_string(),
        })?;
        let dir = input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let dump_path = dir.join(format!("{stem}{DUMP_SUFFIX}"));

        let load_error = |reason: String| DocError::Load {
            library: stem.clone(),
            reason,
        };
        let data = fs::read_to_string(&dump_path)
            .map_err(|e| load_error(format!("cannot read {}: {e}", dump_path.display())))?;
        let dump: Dump = serde_json::from_str(&data)
            .map_err(|e| load_error(format!("invalid metadata dump {}: {e}", dump_path.display())))?;

        let provider = DumpProvider {
            name: if dump.name.is_empty() {
                stem.clone()
            } else {
                dump.name
            },
            dir,
            stem,
            references: dump.references,
            types: dump.types,
            catalog,
        };
        provider.resolve_references()?;
        debug!(
            library = %provider.name,
            types = provider.types.len(),
            "loaded metadata dump"
        );
        Ok(provider)
    }

    fn resolve_references(&self) -> Result<()> {
        for reference in &self.references {
            if is_runtime_provided(reference) {
                continue;
            }
            let found = [LIBRARY_SUFFIX, DUMP_SUFFIX]
                .iter()
                .any(|suffix| self.dir.join(format!("{reference}{suffix}")).exists());
            if !found {
                return Err(DocError::Load {
                    library: self.name.clone(),
                    reason: format!(
                        "referenced library {reference} not found in {}",
                        self.dir.display()
                    ),
                });
            }
        }
        Ok(())
    }

    /// The XML doc file expected next to the library.
    pub fn comment_path(&self) -> PathBuf {
        self.dir.join(format!("{}.xml", self.stem))
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }
}

impl MetadataProvider for DumpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn all_types(&self) -> &[TypeInfo] {
        &self.types
    }

    fn catalog(&self) -> &MarkerCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::catalog::Role;
    use tempfile::TempDir;

    const DUMP: &str = r#"{
        "name": "Acme.Lib",
        "references": ["ScriptEngine", "System.Core", "mscorlib"],
        "types": [
            {
                "fullName": "Acme.Lib.Widget",
                "name": "Widget",
                "attributes": [
                    { "type": "ScriptEngine.Machine.Contexts.ContextClassAttribute", "args": ["Виджет", "Widget"] }
                ],
                "methods": [
                    { "name": "Resize", "parameters": [{ "name": "size", "type": "System.Int32" }], "returnType": "System.Int32" }
                ]
            },
            { "fullName": "Acme.Lib.Internal", "name": "Internal" }
        ]
    }"#;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn stems_from_either_input_form() {
        assert_eq!(library_stem(Path::new("lib/Acme.Lib.dll")).as_deref(), Some("Acme.Lib"));
        assert_eq!(
            library_stem(Path::new("lib/Acme.Lib.meta.json")).as_deref(),
            Some("Acme.Lib")
        );
        assert!(is_library_input(Path::new("Acme.Lib.dll")));
        assert!(!is_library_input(Path::new("Acme.Lib.xml")));
    }

    #[test]
    fn opens_dll_path_through_its_dump() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Acme.Lib.meta.json", DUMP);
        write(dir.path(), "ScriptEngine.dll", "");

        let provider =
            DumpProvider::open(&dir.path().join("Acme.Lib.dll"), MarkerCatalog::default()).unwrap();
        assert_eq!(provider.name(), "Acme.Lib");
        assert_eq!(provider.all_types().len(), 2);
        assert_eq!(provider.comment_path(), dir.path().join("Acme.Lib.xml"));

        let classes = provider.types_with_role(Role::Class).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].full_name, "Acme.Lib.Widget");
        assert_eq!(classes[0].methods[0].return_type.doc_name(), "System.Int32");
    }

    #[test]
    fn unresolved_reference_is_load_error() {
        let dir = TempDir::new().unwrap();
        let input = write(dir.path(), "Acme.Lib.meta.json", DUMP);
        let err = DumpProvider::open(&input, MarkerCatalog::default()).unwrap_err();
        assert!(matches!(err, DocError::Load { ref reason, .. } if reason.contains("ScriptEngine")));
    }

    #[test]
    fn missing_or_broken_dump_is_load_error() {
        let dir = TempDir::new().unwrap();
        let err = DumpProvider::open(&dir.path().join("Nope.dll"), MarkerCatalog::default())
            .unwrap_err();
        assert!(matches!(err, DocError::Load { ref library, .. } if library == "Nope"));

        let input = write(dir.path(), "Broken.meta.json", "{ not json");
        let err = DumpProvider::open(&input, MarkerCatalog::default()).unwrap_err();
        assert!(matches!(err, DocError::Load { .. }));
    }

    #[test]
    fn empty_name_falls_back_to_stem() {
        let dir = TempDir::new().unwrap();
        let input = write(dir.path(), "Plain.meta.json", r#"{ "types": [] }"#);
        let provider = DumpProvider::open(&input, MarkerCatalog::default()).unwrap();
        assert_eq!(provider.name(), "Plain");
        assert!(provider.references().is_empty());
    }
}
