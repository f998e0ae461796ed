//! GitHub-flavored markdown renderer.
//!
//! One `#` heading per library, an index of its types, then a `##` section
//! per global context, class and enumeration. Type names in signatures go
//! through the name normalizer; known library types become anchor links.

use crate::comments::CommentBlock;
use crate::model::*;
use crate::render::{access_label, expand_links, render_rich, signature, Markup, RenderContext, Renderer};
use crate::toc;
use anyhow::Result;

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, docs: &DocumentCollection, ctx: &RenderContext<'_>) -> Result<String> {
        let mut output = String::new();
        for library in &docs.libraries {
            output.push_str(&render_library(library, ctx));
            output.push('\n');
        }
        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

struct Md;

impl Markup for Md {
    fn text(&self, text: &str) -> String {
        text.to_string()
    }

    fn code(&self, text: &str) -> String {
        format!("`{}`", text)
    }

    fn strong(&self, text: &str) -> String {
        format!("**{}**", text)
    }

    fn emphasis(&self, text: &str) -> String {
        format!("_{}_", text)
    }

    fn paragraph(&self, text: &str) -> String {
        format!("\n\n{}\n\n", text)
    }

    fn link(&self, label: &str, target: &str) -> String {
        format!("[{}]({})", label, target)
    }
}

fn heading_of(node: &DocNode) -> &str {
    match node {
        DocNode::GlobalContext(g) => &g.category,
        DocNode::Class(c) => &c.identity.name,
        DocNode::Enum(e) => &e.identity.name,
    }
}

fn render_library(library: &LibraryDoc, ctx: &RenderContext<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("# {}\n", library.name));

    if !library.nodes.is_empty() {
        lines.push("## Содержание\n".to_string());
        for node in &library.nodes {
            lines.push(toc::render_toc_item(heading_of(node), ctx.base_url));
        }
        lines.push(String::new());
    }

    for node in &library.nodes {
        match node {
            DocNode::GlobalContext(g) => render_global_context(&mut lines, g, ctx),
            DocNode::Class(c) => render_class(&mut lines, c, ctx),
            DocNode::Enum(e) => render_enum(&mut lines, e, ctx),
        }
    }

    lines.join("\n")
}

fn render_global_context(lines: &mut Vec<String>, g: &GlobalContextDoc, ctx: &RenderContext<'_>) {
    lines.push(format!("## {}\n", g.category));
    lines.push(format!("> `{}`\n", g.identity.qualified_name));
    render_comment(lines, g.comment.as_ref(), ctx);
    render_properties(lines, &g.properties, ctx);
    render_methods(lines, &g.methods, ctx);
}

fn render_class(lines: &mut Vec<String>, c: &ClassDoc, ctx: &RenderContext<'_>) {
    lines.push(format!("## {}\n", c.identity.name));
    lines.push(format!("> {} (`{}`)\n", c.identity.alias, c.identity.qualified_name));
    render_comment(lines, c.comment.as_ref(), ctx);
    render_properties(lines, &c.properties, ctx);
    render_methods(lines, &c.methods, ctx);

    if !c.constructors.is_empty() {
        lines.push("### Конструкторы\n".to_string());
        for ctor in &c.constructors {
            lines.push(format!("#### {}\n", ctor.name));
            let sig = signature(&ctor.params, None, ctx.names, true);
            lines.push(format!(
                "Новый {}{}\n",
                c.identity.name,
                expand_links(&sig, &Md, ctx)
            ));
            render_comment(lines, ctor.comment.as_ref(), ctx);
        }
    }
}

fn render_enum(lines: &mut Vec<String>, e: &EnumDoc, ctx: &RenderContext<'_>) {
    lines.push(format!("## {}\n", e.identity.name));
    lines.push(format!("> {} (`{}`)\n", e.identity.alias, e.identity.qualified_name));
    render_comment(lines, e.comment.as_ref(), ctx);

    if !e.values.is_empty() {
        lines.push("### Значения\n".to_string());
        for value in &e.values {
            let mut item = format!("* **{}** ({})", value.identity.name, value.identity.alias);
            if let Some(text) = description_text(value.comment.as_ref(), ctx) {
                item.push_str(": ");
                item.push_str(&text.replace('\n', "\n  "));
            }
            lines.push(item);
        }
        lines.push(String::new());
    }
}

fn render_properties(lines: &mut Vec<String>, properties: &[PropertyDoc], ctx: &RenderContext<'_>) {
    if properties.is_empty() {
        return;
    }
    lines.push("### Свойства\n".to_string());
    for prop in properties {
        let mut item = format!(
            "* **{}** ({}), _{}_",
            prop.identity.name,
            prop.identity.alias,
            access_label(prop.access)
        );
        if let Some(text) = description_text(prop.comment.as_ref(), ctx) {
            item.push_str(": ");
            item.push_str(&text.replace('\n', "\n  "));
        }
        lines.push(item);
    }
    lines.push(String::new());
}

fn render_methods(lines: &mut Vec<String>, methods: &[MethodDoc], ctx: &RenderContext<'_>) {
    if methods.is_empty() {
        return;
    }
    lines.push("### Методы\n".to_string());
    for method in methods {
        lines.push(format!("#### {} / {}\n", method.identity.name, method.identity.alias));
        let sig = signature(&method.params, method.return_type.as_deref(), ctx.names, true);
        lines.push(format!(
            "{}{}\n",
            method.identity.name,
            expand_links(&sig, &Md, ctx)
        ));
        render_comment(lines, method.comment.as_ref(), ctx);
    }
}

fn description_text(comment: Option<&CommentBlock>, ctx: &RenderContext<'_>) -> Option<String> {
    let text = render_rich(comment?.description.as_ref()?, &Md, ctx);
    (!text.is_empty()).then_some(text)
}

fn render_description(lines: &mut Vec<String>, comment: Option<&CommentBlock>, ctx: &RenderContext<'_>) {
    if let Some(text) = description_text(comment, ctx) {
        lines.push(text);
        lines.push(String::new());
    }
}

/// Description, parameters, return value and any extra tags of a member.
fn render_comment(lines: &mut Vec<String>, comment: Option<&CommentBlock>, ctx: &RenderContext<'_>) {
    let Some(comment) = comment else {
        return;
    };
    render_description(lines, Some(comment), ctx);

    if !comment.params.is_empty() {
        lines.push("**Параметры**\n".to_string());
        for param in &comment.params {
            let text = render_rich(&param.text, &Md, ctx);
            lines.push(format!("* `{}`: {}", param.name, text.replace('\n', "\n  ")));
        }
        lines.push(String::new());
    }

    if let Some(ref returns) = comment.returns {
        let text = render_rich(returns, &Md, ctx);
        if !text.is_empty() {
            lines.push(format!("**Возвращаемое значение**: {}\n", text));
        }
    }

    for tag in &comment.tags {
        let text = render_rich(&tag.text, &Md, ctx);
        if text.is_empty() {
            continue;
        }
        if tag.tag == "example" {
            lines.push("**Пример**\n".to_string());
            lines.push("```bsl".to_string());
            lines.push(text);
            lines.push("```".to_string());
        } else {
            lines.push(format!("**{}**: {}", tag.tag, text));
        }
        lines.push(String::new());
    }
}
