//! Marker catalog. Maps documentable roles to the annotation types that
//! declare them in library metadata.

use super::{Annotated, Annotation};
use crate::error::{DocError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Namespace of the engine's context annotations.
const CONTEXTS_NS: &str = "ScriptEngine.Machine.Contexts";

/// Role a type or member plays in the scripting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    GlobalContext,
    Class,
    Method,
    Property,
    Constructor,
    SystemEnum,
    EnumerationType,
    EnumerationValue,
    EnumItem,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::GlobalContext,
        Role::Class,
        Role::Method,
        Role::Property,
        Role::Constructor,
        Role::SystemEnum,
        Role::EnumerationType,
        Role::EnumerationValue,
        Role::EnumItem,
    ];

    /// Short name of the engine annotation type for this role.
    fn default_marker_name(self) -> &'static str {
        match self {
            Role::GlobalContext => "GlobalContextAttribute",
            Role::Class => "ContextClassAttribute",
            Role::Method => "ContextMethodAttribute",
            Role::Property => "ContextPropertyAttribute",
            Role::Constructor => "ScriptConstructorAttribute",
            Role::SystemEnum => "SystemEnumAttribute",
            Role::EnumerationType => "EnumerationTypeAttribute",
            Role::EnumerationValue => "EnumValueAttribute",
            Role::EnumItem => "EnumItemAttribute",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::GlobalContext => "global-context",
            Role::Class => "class",
            Role::Method => "method",
            Role::Property => "property",
            Role::Constructor => "constructor",
            Role::SystemEnum => "system-enum",
            Role::EnumerationType => "enumeration-type",
            Role::EnumerationValue => "enumeration-value",
            Role::EnumItem => "enum-item",
        };
        f.write_str(name)
    }
}

/// Identity of an annotation type: its fully qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerId(String);

impl MarkerId {
    pub fn new(type_name: impl Into<String>) -> Self {
        MarkerId(type_name.into())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn matches(&self, annotation: &Annotation) -> bool {
        annotation.type_name == self.0
    }
}

#[derive(Debug, Clone)]
pub struct MarkerCatalog {
    markers: BTreeMap<Role, MarkerId>,
}

impl Default for MarkerCatalog {
    fn default() -> Self {
        let markers = Role::ALL
            .iter()
            .map(|role| {
                let id = MarkerId::new(format!("{}.{}", CONTEXTS_NS, role.default_marker_name()));
                (*role, id)
            })
            .collect();
        MarkerCatalog { markers }
    }
}

impl MarkerCatalog {
    /// Build a catalog holding only the given registrations.
    #[cfg(test)]
    pub fn from_table(table: impl IntoIterator<Item = (Role, MarkerId)>) -> Self {
        MarkerCatalog {
            markers: table.into_iter().collect(),
        }
    }

    /// Replace the registrations for the given roles, keeping the rest.
    pub fn with_overrides(mut self, overrides: &BTreeMap<Role, String>) -> Self {
        for (role, type_name) in overrides {
            self.markers.insert(*role, MarkerId::new(type_name.clone()));
        }
        self
    }

    pub fn marker_type(&self, role: Role) -> Result<&MarkerId> {
        self.markers.get(&role).ok_or(DocError::UnsupportedRole(role))
    }

    /// First annotation on `member` that declares `role`, in declaration order.
    pub fn marker_of<'a>(
        &self,
        member: &'a dyn Annotated,
        role: Role,
    ) -> Result<Option<&'a Annotation>> {
        let id = self.marker_type(role)?;
        Ok(member.annotations().iter().find(|a| id.matches(a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{AttrValue, PropertyInfo};

    fn annotation(type_name: &str, first: &str) -> Annotation {
        Annotation {
            type_name: type_name.to_string(),
            args: vec![AttrValue::Str(first.to_string())],
            named: Vec::new(),
        }
    }

    #[test]
    fn default_catalog_covers_every_role() {
        let catalog = MarkerCatalog::default();
        for role in Role::ALL {
            assert!(catalog.marker_type(role).is_ok(), "missing {role}");
        }
        assert_eq!(
            catalog.marker_type(Role::Class).unwrap().as_str(),
            "ScriptEngine.Machine.Contexts.ContextClassAttribute"
        );
    }

    #[test]
    fn partial_catalog_reports_unsupported_role() {
        let catalog =
            MarkerCatalog::from_table([(Role::Class, MarkerId::new("Engine.ClassAttribute"))]);
        let err = catalog.marker_type(Role::EnumItem).unwrap_err();
        assert!(matches!(err, DocError::UnsupportedRole(Role::EnumItem)));
    }

    #[test]
    fn marker_of_takes_first_in_declaration_order() {
        let catalog = MarkerCatalog::default();
        let prop = PropertyInfo {
            name: "Size".to_string(),
            has_getter: true,
            has_setter: false,
            attributes: vec![
                annotation("System.ObsoleteAttribute", "old"),
                annotation("ScriptEngine.Machine.Contexts.ContextPropertyAttribute", "Размер"),
                annotation("ScriptEngine.Machine.Contexts.ContextPropertyAttribute", "Второй"),
            ],
        };
        let found = catalog.marker_of(&prop, Role::Property).unwrap().unwrap();
        assert_eq!(found.arg_str(0), Some("Размер"));
        assert!(catalog.marker_of(&prop, Role::Method).unwrap().is_none());
    }

    #[test]
    fn overrides_replace_single_entries() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Role::Method, "My.Engine.MethodAttribute".to_string());
        let catalog = MarkerCatalog::default().with_overrides(&overrides);
        assert_eq!(
            catalog.marker_type(Role::Method).unwrap().as_str(),
            "My.Engine.MethodAttribute"
        );
        assert_eq!(
            catalog.marker_type(Role::Property).unwrap().as_str(),
            "ScriptEngine.Machine.Contexts.ContextPropertyAttribute"
        );
    }
}
