//! Document tree builder. Turns one library's metadata and comment file
//! into a [`LibraryDoc`].
//!
//! Processing runs through a fixed sequence of stages:
//! `Start → ValidateNames → IndexComments → EmitGlobalContexts → EmitClasses
//! → EmitEnums → Done`.

use crate::comments::{CommentBlock, CommentSource, CommentStore};
use crate::error::Result;
use crate::metadata::catalog::Role;
use crate::metadata::{
    Annotation, AttrValue, MetadataProvider, MethodInfo, PropertyInfo, TypeInfo,
};
use crate::model::*;
use crate::names::{TypeDictionary, TypeEntry};
use crate::signature::{key_for, method_id, Member};
use tracing::{debug, warn};

/// Constructor name used when the marker does not give one.
pub const DEFAULT_CONSTRUCTOR_NAME: &str = "По умолчанию";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    ValidateNames,
    IndexComments,
    EmitGlobalContexts,
    EmitClasses,
    EmitEnums,
    Done,
}

impl Stage {
    fn next(self) -> Stage {
        match self {
            Stage::Start => Stage::ValidateNames,
            Stage::ValidateNames => Stage::IndexComments,
            Stage::IndexComments => Stage::EmitGlobalContexts,
            Stage::EmitGlobalContexts => Stage::EmitClasses,
            Stage::EmitClasses => Stage::EmitEnums,
            Stage::EmitEnums | Stage::Done => Stage::Done,
        }
    }
}

/// Build the document tree of one library.
///
/// Classes and global contexts found on the way are appended to `dictionary`.
pub fn build_library(
    provider: &dyn MetadataProvider,
    comments: &CommentSource,
    dictionary: &mut TypeDictionary,
) -> Result<LibraryDoc> {
    LibraryBuilder {
        provider,
        comments,
        dictionary,
        stage: Stage::Start,
        store: CommentStore::default(),
        nodes: Vec::new(),
    }
    .run()
}

struct LibraryBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    comments: &'a CommentSource,
    dictionary: &'a mut TypeDictionary,
    stage: Stage,
    store: CommentStore,
    nodes: Vec<DocNode>,
}

impl<'a> LibraryBuilder<'a> {
    fn run(mut self) -> Result<LibraryDoc> {
        while self.stage != Stage::Done {
            self.step()?;
        }
        Ok(LibraryDoc {
            name: self.provider.name().to_string(),
            nodes: self.nodes,
        })
    }

    fn step(&mut self) -> Result<()> {
        debug!(library = self.provider.name(), stage = ?self.stage, "build stage");
        let provider = self.provider;
        match self.stage {
            Stage::Start | Stage::Done => {}
            Stage::ValidateNames => self.comments.validate_name(provider.name())?,
            Stage::IndexComments => {
                self.store = CommentStore::index(self.comments)?;
                if self.store.is_empty() {
                    warn!("{}: XML doc has no members", provider.name());
                } else {
                    debug!(entries = self.store.len(), "indexed comments");
                }
            }
            Stage::EmitGlobalContexts => {
                for ty in provider.types_with_role(Role::GlobalContext)? {
                    let Some(marker) = provider.marker_for(ty, Role::GlobalContext)? else {
                        continue;
                    };
                    self.register(ty, marker);
                    match self.global_context(ty, marker)? {
                        Some(node) => self.nodes.push(DocNode::GlobalContext(node)),
                        None => debug!(ty = %ty.full_name, "global context without category skipped"),
                    }
                }
            }
            Stage::EmitClasses => {
                for ty in provider.types_with_role(Role::Class)? {
                    let Some(marker) = provider.marker_for(ty, Role::Class)? else {
                        continue;
                    };
                    self.register(ty, marker);
                    let node = self.class(ty, marker)?;
                    self.nodes.push(DocNode::Class(node));
                }
            }
            Stage::EmitEnums => {
                for (role, kind) in [
                    (Role::SystemEnum, EnumKind::System),
                    (Role::EnumerationType, EnumKind::Enumeration),
                ] {
                    for ty in provider.types_with_role(role)? {
                        let Some(marker) = provider.marker_for(ty, role)? else {
                            continue;
                        };
                        let node = self.enumeration(ty, marker, kind)?;
                        self.nodes.push(DocNode::Enum(node));
                    }
                }
            }
        }
        self.stage = self.stage.next();
        Ok(())
    }

    fn register(&mut self, ty: &TypeInfo, marker: &Annotation) {
        let entry = TypeEntry {
            full_name: ty.full_name.clone(),
            short_name: ty.name.clone(),
            name_en: marker.arg_str(1).unwrap_or_default().to_string(),
            name_ru: marker.arg_str(0).unwrap_or_default().to_string(),
        };
        if self.dictionary.add(entry) {
            debug!(ty = %ty.full_name, "added to type dictionary");
        }
    }

    fn comment(&self, key: &str) -> Option<CommentBlock> {
        self.store.lookup(key).cloned()
    }

    fn global_context(&self, ty: &TypeInfo, marker: &Annotation) -> Result<Option<GlobalContextDoc>> {
        let Some(category) = marker.named_arg("Category").and_then(AttrValue::as_str) else {
            return Ok(None);
        };
        let key = key_for(&ty.full_name, Member::Type);
        Ok(Some(GlobalContextDoc {
            identity: identity(ty.full_name.clone(), marker, &ty.name),
            category: category.to_string(),
            comment: self.comment(&key),
            key,
            properties: self.properties(ty)?,
            methods: self.methods(ty)?,
        }))
    }

    fn class(&self, ty: &TypeInfo, marker: &Annotation) -> Result<ClassDoc> {
        let key = key_for(&ty.full_name, Member::Type);
        Ok(ClassDoc {
            identity: identity(ty.full_name.clone(), marker, &ty.name),
            comment: self.comment(&key),
            key,
            properties: self.properties(ty)?,
            methods: self.methods(ty)?,
            constructors: self.constructors(ty)?,
        })
    }

    fn enumeration(&self, ty: &TypeInfo, marker: &Annotation, kind: EnumKind) -> Result<EnumDoc> {
        let key = key_for(&ty.full_name, Member::Type);
        Ok(EnumDoc {
            identity: identity(ty.full_name.clone(), marker, &ty.name),
            enum_kind: kind,
            comment: self.comment(&key),
            key,
            values: self.enum_values(ty)?,
        })
    }

    fn properties(&self, ty: &TypeInfo) -> Result<Vec<PropertyDoc>> {
        let mut out = Vec::new();
        for prop in &ty.properties {
            if let Some(marker) = self.provider.marker_for(prop, Role::Property)? {
                out.push(self.property(ty, prop, marker));
            }
        }
        Ok(out)
    }

    fn property(&self, ty: &TypeInfo, prop: &PropertyInfo, marker: &Annotation) -> PropertyDoc {
        let key = key_for(&ty.full_name, Member::Property(&prop.name));
        PropertyDoc {
            identity: identity(format!("{}.{}", ty.full_name, prop.name), marker, &prop.name),
            access: property_access(marker, prop),
            comment: self.comment(&key),
            key,
        }
    }

    fn methods(&self, ty: &TypeInfo) -> Result<Vec<MethodDoc>> {
        let mut out = Vec::new();
        for method in &ty.methods {
            if let Some(marker) = self.provider.marker_for(method, Role::Method)? {
                out.push(self.method(ty, method, marker));
            }
        }
        Ok(out)
    }

    fn method(&self, ty: &TypeInfo, method: &MethodInfo, marker: &Annotation) -> MethodDoc {
        let key = key_for(
            &ty.full_name,
            Member::Method {
                name: &method.name,
                params: &method.parameters,
            },
        );
        let qualified = format!("{}.{}", ty.full_name, method_id(&method.name, &method.parameters));
        MethodDoc {
            identity: identity(qualified, marker, &method.name),
            params: params(method),
            return_type: (!method.return_type.is_void()).then(|| method.return_type.doc_name()),
            comment: self.comment(&key),
            key,
        }
    }

    fn constructors(&self, ty: &TypeInfo) -> Result<Vec<ConstructorDoc>> {
        let mut out = Vec::new();
        for method in ty.methods.iter().filter(|m| m.is_static) {
            let Some(marker) = self.provider.marker_for(method, Role::Constructor)? else {
                continue;
            };
            let name = match marker.named_arg("Name").and_then(AttrValue::as_str) {
                None => DEFAULT_CONSTRUCTOR_NAME.to_string(),
                Some("") => {
                    debug!(ty = %ty.full_name, method = %method.name, "unnamed constructor skipped");
                    continue;
                }
                Some(name) => name.to_string(),
            };
            let key = key_for(
                &ty.full_name,
                Member::Method {
                    name: &method.name,
                    params: &method.parameters,
                },
            );
            out.push(ConstructorDoc {
                qualified_name: format!(
                    "{}.{}",
                    ty.full_name,
                    method_id(&method.name, &method.parameters)
                ),
                name,
                params: params(method),
                comment: self.comment(&key),
                key,
            });
        }
        Ok(out)
    }

    fn enum_values(&self, ty: &TypeInfo) -> Result<Vec<EnumValueDoc>> {
        let mut out = Vec::new();
        for prop in &ty.properties {
            if let Some(marker) = self.provider.marker_for(prop, Role::EnumerationValue)? {
                out.push(self.enum_value(ty, &prop.name, marker));
            }
        }
        for field in &ty.fields {
            if let Some(marker) = self.provider.marker_for(field, Role::EnumItem)? {
                out.push(self.enum_value(ty, &field.name, marker));
            }
        }
        Ok(out)
    }

    fn enum_value(&self, ty: &TypeInfo, member: &str, marker: &Annotation) -> EnumValueDoc {
        let key = key_for(&ty.full_name, Member::Property(member));
        EnumValueDoc {
            identity: identity(format!("{}.{}", ty.full_name, member), marker, member),
            comment: self.comment(&key),
            key,
        }
    }
}

/// Localized name and alias from the marker's first two positional arguments.
fn identity(qualified_name: String, marker: &Annotation, short_name: &str) -> Identity {
    let name = marker.arg_str(0).unwrap_or(short_name).to_string();
    let alias = match marker.arg_str(1) {
        Some(alias) if !alias.is_empty() => alias.to_string(),
        _ => short_name.to_string(),
    };
    Identity {
        qualified_name,
        name,
        alias,
    }
}

/// Explicit `CanRead`/`CanWrite` overrides, else getter/setter presence.
fn property_access(marker: &Annotation, prop: &PropertyInfo) -> PropertyAccess {
    let flag = |name: &str| marker.named_arg(name).and_then(AttrValue::as_bool);
    PropertyAccess {
        readable: flag("CanRead").unwrap_or(prop.has_getter),
        writeable: flag("CanWrite").unwrap_or(prop.has_setter),
    }
}

fn params(method: &MethodInfo) -> Vec<ParamDoc> {
    method
        .parameters
        .iter()
        .map(|p| ParamDoc {
            name: p.name.clone(),
            type_name: p.ty.doc_name(),
            optional: p.optional,
        })
        .collect()
}
