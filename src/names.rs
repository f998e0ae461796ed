//! Name translation. Replaces engine and library type names with their
//! localized script names.

use crate::error::{DocError, Result};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Prefix marking a translated name that should become a link.
pub const LINK_MARKER: &str = "link::";

/// Primitive and core engine types, replaced verbatim and never linked.
const BUILTIN_NAMES: &[(&str, &str)] = &[
    ("System.String", "Строка"),
    ("System.DateTime", "Дата"),
    ("System.Int32", "Число"),
    ("System.Int64", "Число"),
    ("System.Boolean", "Булево"),
    ("ScriptEngine.Machine.IValue", "Произвольный"),
    ("ScriptEngine.Machine.IRuntimeContextInstance", "ИнформацияОСценарии"),
];

/// One entry of the persisted translation table.
///
/// Field names match the historic `map.json` layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "ShortName")]
    pub short_name: String,
    #[serde(rename = "nameEng")]
    pub name_en: String,
    #[serde(rename = "nameRus")]
    pub name_ru: String,
}

/// Append-only table of library types, persisted between runs.
#[derive(Debug, Default)]
pub struct TypeDictionary {
    entries: Vec<TypeEntry>,
    added: usize,
}

impl TypeDictionary {
    /// Load `path`, or start empty when it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(TypeDictionary::default());
        }
        let data = fs::read_to_string(path)
            .map_err(|e| DocError::io(format!("failed to read {}", path.display()), e))?;
        let entries: Vec<TypeEntry> = serde_json::from_str(&data)
            .map_err(|e| DocError::json(format!("invalid type map {}", path.display()), e))?;
        Ok(TypeDictionary { entries, added: 0 })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| DocError::json("failed to encode type map", e))?;
        fs::write(path, data)
            .map_err(|e| DocError::io(format!("failed to write {}", path.display()), e))
    }

    pub fn find_by_full_name(&self, full_name: &str) -> Option<&TypeEntry> {
        self.entries.iter().find(|e| e.full_name == full_name)
    }

    /// Append `entry` unless its full name is already known. Returns whether
    /// it was inserted.
    pub fn add(&mut self, entry: TypeEntry) -> bool {
        if self.find_by_full_name(&entry.full_name).is_some() {
            return false;
        }
        self.entries.push(entry);
        self.added += 1;
        true
    }

    pub fn entries(&self) -> &[TypeEntry] {
        &self.entries
    }

    /// Entries appended since load.
    pub fn added(&self) -> usize {
        self.added
    }
}

struct Rule {
    pattern: Regex,
    replacement: String,
    linkable: bool,
}

/// Rewrites qualified type names inside free text.
pub struct NameNormalizer {
    rules: Vec<Rule>,
}

impl NameNormalizer {
    /// Built-in names first, then dictionary entries in table order.
    pub fn new(dictionary: &TypeDictionary) -> Self {
        let builtins = BUILTIN_NAMES
            .iter()
            .map(|(name, localized)| (*name, *localized, false));
        let library = dictionary
            .entries()
            .iter()
            .filter(|e| !e.full_name.is_empty() && !e.name_ru.is_empty())
            .map(|e| (e.full_name.as_str(), e.name_ru.as_str(), true));

        let rules = builtins
            .chain(library)
            .filter_map(|(name, localized, linkable)| {
                let built = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(name)))
                    .case_insensitive(true)
                    .build();
                let pattern = match built {
                    Ok(pattern) => pattern,
                    Err(e) => {
                        warn!(fullName = name, "type name left untranslated: {}", e);
                        return None;
                    }
                };
                Some(Rule {
                    pattern,
                    replacement: localized.to_string(),
                    linkable,
                })
            })
            .collect();
        NameNormalizer { rules }
    }

    /// Replace every known qualified name in `text`. With `as_link`,
    /// library names are prefixed with [`LINK_MARKER`].
    pub fn translate(&self, text: &str, as_link: bool) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            let replacement = if as_link && rule.linkable {
                format!("{}{}", LINK_MARKER, rule.replacement)
            } else {
                rule.replacement.clone()
            };
            out = rule
                .pattern
                .replace_all(&out, NoExpand(&replacement))
                .into_owned();
        }
        out
    }
}
