//! Library metadata model and the provider seam.
//!
//! The builder only ever sees metadata through [`MetadataProvider`]; the
//! concrete introspection mechanism (here: JSON dumps, see [`dump`]) can be
//! swapped without touching it.

pub mod catalog;
pub mod dump;

use crate::error::Result;
use crate::signature::TypeRef;
use catalog::{MarkerCatalog, Role};
use serde::Deserialize;

/// Anything that can carry annotations.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];
}

/// Annotation argument value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Null,
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedArgument {
    pub name: String,
    pub value: AttrValue,
}

/// One annotation instance attached to a type or member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub type_name: String,
    /// Positional (constructor) arguments.
    #[serde(default)]
    pub args: Vec<AttrValue>,
    /// Named arguments in declaration order.
    #[serde(default)]
    pub named: Vec<NamedArgument>,
}

impl Annotation {
    pub fn arg_str(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(AttrValue::as_str)
    }

    /// Value of the first named argument called `name`.
    pub fn named_arg(&self, name: &str) -> Option<&AttrValue> {
        self.named.iter().find(|n| n.name == name).map(|n| &n.value)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default = "TypeRef::void")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub attributes: Vec<Annotation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub name: String,
    #[serde(default, rename = "getter")]
    pub has_getter: bool,
    #[serde(default, rename = "setter")]
    pub has_setter: bool,
    #[serde(default)]
    pub attributes: Vec<Annotation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Annotation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    /// Fully qualified origin name, e.g. `Acme.Lib.Widget`.
    pub full_name: String,
    /// Short origin name, e.g. `Widget`.
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Annotation>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

macro_rules! impl_annotated {
    ($($ty:ty),*) => {
        $(impl Annotated for $ty {
            fn annotations(&self) -> &[Annotation] {
                &self.attributes
            }
        })*
    };
}

impl_annotated!(TypeInfo, MethodInfo, PropertyInfo, FieldInfo);

/// Read access to one loaded library.
pub trait MetadataProvider {
    /// The library's own name, e.g. `Acme.Lib`.
    fn name(&self) -> &str;

    fn all_types(&self) -> &[TypeInfo];

    fn catalog(&self) -> &MarkerCatalog;

    /// Types carrying the marker for `role`, in declaration order.
    fn types_with_role(&self, role: Role) -> Result<Vec<&TypeInfo>> {
        let mut marked = Vec::new();
        for ty in self.all_types() {
            if self.catalog().marker_of(ty, role)?.is_some() {
                marked.push(ty);
            }
        }
        Ok(marked)
    }

    fn marker_for<'a>(&self, member: &'a dyn Annotated, role: Role) -> Result<Option<&'a Annotation>> {
        self.catalog().marker_of(member, role)
    }
}
