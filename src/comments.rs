//! Comment store. XML doc comments keyed by member signature.
//!
//! The source is the file the compiler emits next to a library:
//!
//! ```xml
//! <doc>
//!   <assembly><name>Acme.Lib</name></assembly>
//!   <members>
//!     <member name="M:Acme.Lib.Widget.Build"><summary>Creates a widget.</summary></member>
//!   </members>
//! </doc>
//! ```

use crate::error::{DocError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use sxd_document::dom::{ChildOfElement, Element};
use sxd_document::Package;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Text with its nested markup preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RichText {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    pub content: Vec<RichNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum RichNode {
    Text { text: String },
    Element { name: String, body: RichText },
}

impl RichText {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Concatenated text of all descendants. Self-closing references
    /// (`<see cref=".."/>`, `<paramref name=".."/>`) contribute their target.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.content {
            match node {
                RichNode::Text { text } => out.push_str(text),
                RichNode::Element { body, .. } if !body.is_empty() => body.collect_text(out),
                RichNode::Element { body, .. } => {
                    if let Some(target) = body.reference_target() {
                        out.push_str(target);
                    }
                }
            }
        }
    }

    /// Target of an empty reference element, without the `T:`-style prefix.
    pub fn reference_target(&self) -> Option<&str> {
        let raw = self
            .attribute("cref")
            .or_else(|| self.attribute("name"))
            .or_else(|| self.attribute("langword"))?;
        Some(strip_key_prefix(raw))
    }
}

/// `T:Acme.Lib.Widget` → `Acme.Lib.Widget`.
pub fn strip_key_prefix(key: &str) -> &str {
    match key.as_bytes() {
        [kind, b':', ..] if kind.is_ascii_uppercase() => &key[2..],
        _ => key,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDoc {
    pub name: String,
    pub text: RichText,
}

/// Any other tag found next to `summary`, e.g. `example` or `remarks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDoc {
    pub tag: String,
    pub text: RichText,
}

/// Documentation attached to one member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<RichText>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<RichText>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagDoc>,
}

impl CommentBlock {
    fn from_member(member: Element<'_>) -> Self {
        let mut block = CommentBlock::default();
        for child in child_elements(member) {
            let text = rich_text(child);
            match child.name().local_part() {
                "summary" if block.description.is_none() => block.description = Some(text),
                "returns" if block.returns.is_none() => block.returns = Some(text),
                "param" => block.params.push(ParamDoc {
                    name: text.attribute("name").unwrap_or_default().to_string(),
                    text,
                }),
                // repeated summary/returns are kept verbatim with the other tags
                tag => block.tags.push(TagDoc {
                    tag: tag.to_string(),
                    text,
                }),
            }
        }
        block
    }

    #[cfg(test)]
    pub fn param(&self, name: &str) -> Option<&RichText> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.text)
    }
}

fn child_elements<'d>(element: Element<'d>) -> impl Iterator<Item = Element<'d>> {
    element.children().into_iter().filter_map(|c| c.element())
}

fn child_element<'d>(element: Element<'d>, name: &str) -> Option<Element<'d>> {
    child_elements(element).find(|e| e.name().local_part() == name)
}

fn rich_text(element: Element<'_>) -> RichText {
    let attributes = element
        .attributes()
        .iter()
        .map(|a| Attribute {
            name: a.name().local_part().to_string(),
            value: a.value().to_string(),
        })
        .collect();

    let mut content: Vec<RichNode> = Vec::new();
    for child in element.children() {
        match child {
            ChildOfElement::Text(t) => {
                if let Some(RichNode::Text { text }) = content.last_mut() {
                    text.push_str(t.text());
                } else {
                    content.push(RichNode::Text {
                        text: t.text().to_string(),
                    });
                }
            }
            ChildOfElement::Element(e) => content.push(RichNode::Element {
                name: e.name().local_part().to_string(),
                body: rich_text(e),
            }),
            _ => {}
        }
    }

    RichText {
        attributes,
        content,
    }
}

/// A parsed XML doc file.
pub struct CommentSource {
    path: PathBuf,
    package: Package,
}

impl CommentSource {
    pub fn read(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)
            .map_err(|e| DocError::io(format!("failed to read {}", path.display()), e))?;
        Self::parse(path, &xml)
    }

    pub fn parse(path: &Path, xml: &str) -> Result<Self> {
        let package = sxd_document::parser::parse(xml).map_err(|e| DocError::Format {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })?;
        Ok(CommentSource {
            path: path.to_path_buf(),
            package,
        })
    }

    fn format_error(&self, reason: &str) -> DocError {
        DocError::Format {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    fn with_root<T>(&self, f: impl FnOnce(Element<'_>) -> Result<T>) -> Result<T> {
        let document = self.package.as_document();
        let root = document
            .root()
            .children()
            .into_iter()
            .find_map(|c| c.element())
            .filter(|e| e.name().local_part() == "doc")
            .ok_or_else(|| self.format_error("root element <doc> is missing"))?;
        f(root)
    }

    /// Declared `assembly/name`.
    pub fn assembly_name(&self) -> Result<String> {
        self.with_root(|root| {
            child_element(root, "assembly")
                .and_then(|asm| child_element(asm, "name"))
                .map(|name| rich_text(name).plain_text().trim().to_string())
                .ok_or_else(|| self.format_error("element <assembly><name> is missing"))
        })
    }

    /// Check the declared assembly against `library`, ignoring case.
    pub fn validate_name(&self, library: &str) -> Result<()> {
        let declared = self.assembly_name()?;
        if declared.to_lowercase() != library.to_lowercase() {
            return Err(DocError::NameMismatch {
                expected: library.to_string(),
                found: declared,
            });
        }
        Ok(())
    }
}

/// Key → comment block index for one library.
#[derive(Debug, Default)]
pub struct CommentStore {
    entries: HashMap<String, CommentBlock>,
}

impl CommentStore {
    /// Index `doc/members/member` by their `name` attribute. Later duplicates win.
    pub fn index(source: &CommentSource) -> Result<Self> {
        source.with_root(|root| {
            let mut entries = HashMap::new();
            let Some(members) = child_element(root, "members") else {
                return Ok(CommentStore { entries });
            };
            for member in child_elements(members) {
                let key = member
                    .attribute_value("name")
                    .ok_or_else(|| source.format_error("member without a name attribute"))?;
                entries.insert(key.to_string(), CommentBlock::from_member(member));
            }
            Ok(CommentStore { entries })
        })
    }

    pub fn lookup(&self, key: &str) -> Option<&CommentBlock> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
