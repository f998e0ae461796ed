//! XML renderer. The `oscript-docs` layout consumed by the site generator:
//!
//! ```xml
//! <oscript-docs>
//!   <assembly name="Acme.Lib">
//!     <contexts>
//!       <global-context clr-name="..."/>
//!       <context clr-name="..."/>
//!       <enum clr-name="..." kind="system"/>
//!     </contexts>
//!   </assembly>
//! </oscript-docs>
//! ```

use crate::comments::{CommentBlock, RichNode, RichText};
use crate::model::*;
use crate::names::NameNormalizer;
use crate::render::{collapse_whitespace, signature, RenderContext, Renderer};
use anyhow::{Context, Result};
use sxd_document::dom::{Document, Element};
use sxd_document::writer::format_document;
use sxd_document::Package;

pub struct XmlRenderer;

impl Renderer for XmlRenderer {
    fn render(&self, docs: &DocumentCollection, ctx: &RenderContext<'_>) -> Result<String> {
        let package = Package::new();
        let doc = package.as_document();
        let tree = Tree {
            doc: &doc,
            names: ctx.names,
        };

        let root = doc.create_element("oscript-docs");
        doc.root().append_child(root);
        for library in &docs.libraries {
            root.append_child(tree.library(library));
        }

        let mut buf = Vec::new();
        format_document(&doc, &mut buf).context("failed to write XML output")?;
        let mut out = String::from_utf8(buf).context("XML output is not valid UTF-8")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "xml"
    }
}

struct Tree<'a, 'd> {
    doc: &'a Document<'d>,
    names: &'a NameNormalizer,
}

impl<'d> Tree<'_, 'd> {
    fn element(&self, name: &str) -> Element<'d> {
        self.doc.create_element(name)
    }

    fn text_child(&self, parent: Element<'d>, name: &str, text: &str) {
        let child = self.element(name);
        child.set_text(text);
        parent.append_child(child);
    }

    fn library(&self, library: &LibraryDoc) -> Element<'d> {
        let assembly = self.element("assembly");
        assembly.set_attribute_value("name", &library.name);
        let contexts = self.element("contexts");
        for node in &library.nodes {
            contexts.append_child(self.node(node));
        }
        assembly.append_child(contexts);
        assembly
    }

    fn node(&self, node: &DocNode) -> Element<'d> {
        let tag = match node {
            DocNode::GlobalContext(_) => "global-context",
            DocNode::Class(_) => "context",
            DocNode::Enum(_) => "enum",
        };
        let el = self.identity(tag, node.identity());
        match node {
            DocNode::GlobalContext(g) => {
                self.text_child(el, "category", &g.category);
                self.comment(el, g.comment.as_ref());
                self.properties(el, &g.properties);
                self.methods(el, &g.methods);
            }
            DocNode::Class(c) => {
                self.comment(el, c.comment.as_ref());
                self.properties(el, &c.properties);
                self.methods(el, &c.methods);
                self.constructors(el, &c.constructors);
            }
            DocNode::Enum(e) => {
                let kind = match e.enum_kind {
                    EnumKind::System => "system",
                    EnumKind::Enumeration => "enumeration",
                };
                el.set_attribute_value("kind", kind);
                self.comment(el, e.comment.as_ref());
                self.values(el, &e.values);
            }
        }
        el
    }

    fn identity(&self, tag: &str, identity: &Identity) -> Element<'d> {
        let el = self.element(tag);
        el.set_attribute_value("clr-name", &identity.qualified_name);
        self.text_child(el, "name", &identity.name);
        self.text_child(el, "alias", &identity.alias);
        el
    }

    fn properties(&self, parent: Element<'d>, properties: &[PropertyDoc]) {
        if properties.is_empty() {
            return;
        }
        let list = self.element("properties");
        for prop in properties {
            let el = self.identity("property", &prop.identity);
            self.text_child(el, "readable", &prop.access.readable.to_string());
            self.text_child(el, "writeable", &prop.access.writeable.to_string());
            self.comment(el, prop.comment.as_ref());
            list.append_child(el);
        }
        parent.append_child(list);
    }

    fn methods(&self, parent: Element<'d>, methods: &[MethodDoc]) {
        if methods.is_empty() {
            return;
        }
        let list = self.element("methods");
        for method in methods {
            let el = self.identity("method", &method.identity);
            let sig = signature(&method.params, method.return_type.as_deref(), self.names, false);
            self.text_child(el, "signature", &sig);
            self.comment(el, method.comment.as_ref());
            list.append_child(el);
        }
        parent.append_child(list);
    }

    fn constructors(&self, parent: Element<'d>, constructors: &[ConstructorDoc]) {
        if constructors.is_empty() {
            return;
        }
        let list = self.element("constructors");
        for ctor in constructors {
            let el = self.element("ctor");
            el.set_attribute_value("clr-name", &ctor.qualified_name);
            self.text_child(el, "name", &ctor.name);
            self.text_child(el, "signature", &signature(&ctor.params, None, self.names, false));
            self.comment(el, ctor.comment.as_ref());
            list.append_child(el);
        }
        parent.append_child(list);
    }

    fn values(&self, parent: Element<'d>, values: &[EnumValueDoc]) {
        if values.is_empty() {
            return;
        }
        let list = self.element("values");
        for value in values {
            let el = self.identity("value", &value.identity);
            self.comment(el, value.comment.as_ref());
            list.append_child(el);
        }
        parent.append_child(list);
    }

    fn comment(&self, parent: Element<'d>, comment: Option<&CommentBlock>) {
        let Some(comment) = comment else {
            return;
        };
        if let Some(ref description) = comment.description {
            parent.append_child(self.rich("description", description));
        }
        for param in &comment.params {
            parent.append_child(self.rich("param", &param.text));
        }
        if let Some(ref returns) = comment.returns {
            parent.append_child(self.rich("returns", returns));
        }
        for tag in &comment.tags {
            parent.append_child(self.rich(&tag.tag, &tag.text));
        }
    }

    /// `rich` as element `name`, attributes and nested markup preserved.
    fn rich(&self, name: &str, rich: &RichText) -> Element<'d> {
        let el = self.element(name);
        for attr in &rich.attributes {
            el.set_attribute_value(attr.name.as_str(), &attr.value);
        }
        for node in &rich.content {
            match node {
                RichNode::Text { text } => {
                    let text = collapse_text_node(text);
                    if !text.is_empty() {
                        el.append_child(self.doc.create_text(&text));
                    }
                }
                RichNode::Element { name, body } => el.append_child(self.rich(name, body)),
            }
        }
        el
    }
}

/// Whitespace collapsing for one text node among inline elements: a single
/// space survives at either end when the source had whitespace there.
fn collapse_text_node(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        return if text.is_empty() { String::new() } else { " ".to_string() };
    }
    let mut out = String::with_capacity(collapsed.len() + 2);
    if text.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out
}
