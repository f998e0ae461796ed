//! Document tree. Format-agnostic output of the builder.
//!
//! Every node is tagged with its `kind` and carries the signature `key`
//! used to look up its comments; display names are derived by renderers.

use crate::comments::CommentBlock;
use serde::Serialize;

/// All libraries processed in one run.
#[derive(Debug, Default, Serialize)]
pub struct DocumentCollection {
    pub libraries: Vec<LibraryDoc>,
}

impl DocumentCollection {
    /// Fold a library tree into the collection, appending to an existing
    /// library of the same name.
    pub fn push(&mut self, library: LibraryDoc) {
        match self
            .libraries
            .iter_mut()
            .find(|l| l.name.eq_ignore_ascii_case(&library.name))
        {
            Some(existing) => existing.nodes.extend(library.nodes),
            None => self.libraries.push(library),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.iter().all(|l| l.nodes.is_empty())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DocNode> {
        self.libraries.iter().flat_map(|l| l.nodes.iter())
    }
}

/// Documented surface of one library.
#[derive(Debug, Default, Serialize)]
pub struct LibraryDoc {
    pub name: String,
    pub nodes: Vec<DocNode>,
}

impl LibraryDoc {
    pub fn global_contexts(&self) -> impl Iterator<Item = &GlobalContextDoc> {
        self.nodes.iter().filter_map(|n| match n {
            DocNode::GlobalContext(g) => Some(g),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDoc> {
        self.nodes.iter().filter_map(|n| match n {
            DocNode::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDoc> {
        self.nodes.iter().filter_map(|n| match n {
            DocNode::Enum(e) => Some(e),
            _ => None,
        })
    }
}

/// Root node for one documentable type.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DocNode {
    GlobalContext(GlobalContextDoc),
    Class(ClassDoc),
    Enum(EnumDoc),
}

impl DocNode {
    pub fn identity(&self) -> &Identity {
        match self {
            DocNode::GlobalContext(g) => &g.identity,
            DocNode::Class(c) => &c.identity,
            DocNode::Enum(e) => &e.identity,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            DocNode::GlobalContext(g) => &g.key,
            DocNode::Class(c) => &c.key,
            DocNode::Enum(e) => &e.key,
        }
    }

    pub fn comment(&self) -> Option<&CommentBlock> {
        match self {
            DocNode::GlobalContext(g) => g.comment.as_ref(),
            DocNode::Class(c) => c.comment.as_ref(),
            DocNode::Enum(e) => e.comment.as_ref(),
        }
    }
}

/// Names shared by every documented member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Fully qualified origin name, e.g. `Acme.Lib.Widget.Size`.
    pub qualified_name: String,
    /// Localized (Russian) name from the marker.
    pub name: String,
    /// English alias; never empty.
    pub alias: String,
}

#[derive(Debug, Serialize)]
pub struct GlobalContextDoc {
    pub identity: Identity,
    pub key: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
    pub properties: Vec<PropertyDoc>,
    pub methods: Vec<MethodDoc>,
}

#[derive(Debug, Serialize)]
pub struct ClassDoc {
    pub identity: Identity,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
    pub properties: Vec<PropertyDoc>,
    pub methods: Vec<MethodDoc>,
    pub constructors: Vec<ConstructorDoc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumKind {
    /// Engine-level enumeration exposed as a global value.
    System,
    /// Enumeration type usable from scripts.
    Enumeration,
}

#[derive(Debug, Serialize)]
pub struct EnumDoc {
    pub identity: Identity,
    pub key: String,
    pub enum_kind: EnumKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
    pub values: Vec<EnumValueDoc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertyAccess {
    pub readable: bool,
    pub writeable: bool,
}

#[derive(Debug, Serialize)]
pub struct PropertyDoc {
    pub identity: Identity,
    pub key: String,
    pub access: PropertyAccess,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDoc {
    pub name: String,
    /// Doc-key form of the parameter type.
    #[serde(rename = "type")]
    pub type_name: String,
    pub optional: bool,
}

#[derive(Debug, Serialize)]
pub struct MethodDoc {
    pub identity: Identity,
    pub key: String,
    pub params: Vec<ParamDoc>,
    /// Absent for procedures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
}

#[derive(Debug, Serialize)]
pub struct ConstructorDoc {
    pub qualified_name: String,
    pub name: String,
    pub key: String,
    pub params: Vec<ParamDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
}

#[derive(Debug, Serialize)]
pub struct EnumValueDoc {
    pub identity: Identity,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBlock>,
}
