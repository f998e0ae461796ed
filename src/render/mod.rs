//! Renderer module. Trait-based format dispatch over the document tree.

pub mod html;
pub mod json;
pub mod markdown;
pub mod xml;

use crate::comments::{strip_key_prefix, RichNode, RichText};
use crate::model::{DocumentCollection, ParamDoc, PropertyAccess};
use crate::names::{NameNormalizer, LINK_MARKER};
use crate::toc;
use anyhow::{anyhow, Result};

/// What every renderer may consult besides the tree itself.
pub struct RenderContext<'a> {
    pub names: &'a NameNormalizer,
    /// Prefix for cross-reference links; empty for same-page anchors.
    pub base_url: &'a str,
}

/// Trait for rendering a document collection into a specific output format.
pub trait Renderer {
    fn render(&self, docs: &DocumentCollection, ctx: &RenderContext<'_>) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "html" => Ok(Box::new(html::HtmlRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        "xml" => Ok(Box::new(xml::XmlRenderer)),
        _ => Err(anyhow!(
            "unknown format: {}. Use markdown, html, json, or xml",
            format
        )),
    }
}

/// Trim every line and collapse runs of blank lines into one.
/// Leading and trailing blank lines are dropped.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_blank = false;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        pending_blank = false;
        out.push_str(line);
    }
    out
}

/// `(size?: Число, owner: link::Виджет): Строка`, names translated.
pub fn signature(
    params: &[ParamDoc],
    return_type: Option<&str>,
    names: &NameNormalizer,
    as_link: bool,
) -> String {
    let params = params
        .iter()
        .map(|p| {
            let optional = if p.optional { "?" } else { "" };
            format!("{}{}: {}", p.name, optional, names.translate(&p.type_name, as_link))
        })
        .collect::<Vec<_>>()
        .join(", ");
    match return_type {
        Some(ret) => format!("({}): {}", params, names.translate(ret, as_link)),
        None => format!("({})", params),
    }
}

pub fn access_label(access: PropertyAccess) -> &'static str {
    match (access.readable, access.writeable) {
        (true, true) => "Чтение/Запись",
        (true, false) => "Чтение",
        (false, true) => "Запись",
        (false, false) => "Нет доступа",
    }
}

/// Inline markup a text renderer supplies for comment bodies.
pub(crate) trait Markup {
    /// Literal text, escaped as the format needs.
    fn text(&self, text: &str) -> String;
    fn code(&self, text: &str) -> String;
    fn strong(&self, text: &str) -> String;
    fn emphasis(&self, text: &str) -> String;
    fn paragraph(&self, text: &str) -> String;
    fn link(&self, label: &str, target: &str) -> String;
}

/// Render rich comment text inline, then collapse its whitespace.
pub(crate) fn render_rich(rich: &RichText, markup: &impl Markup, ctx: &RenderContext<'_>) -> String {
    collapse_whitespace(&inline(rich, markup, ctx))
}

fn inline(rich: &RichText, markup: &impl Markup, ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    for node in &rich.content {
        match node {
            RichNode::Text { text } => out.push_str(&markup.text(text)),
            RichNode::Element { name, body } => out.push_str(&element(name, body, markup, ctx)),
        }
    }
    out
}

fn element(name: &str, body: &RichText, markup: &impl Markup, ctx: &RenderContext<'_>) -> String {
    match name {
        "see" | "seealso" if body.is_empty() => match body.attribute("cref") {
            Some(cref) => reference(strip_key_prefix(cref), markup, ctx),
            None => markup.code(body.reference_target().unwrap_or_default()),
        },
        "paramref" | "typeparamref" => markup.code(body.attribute("name").unwrap_or_default()),
        "c" => markup.code(&body.plain_text()),
        "code" | "example" => markup.paragraph(&markup.code(body.plain_text().trim())),
        "para" => markup.paragraph(&inline(body, markup, ctx)),
        "b" | "strong" => markup.strong(&inline(body, markup, ctx)),
        "i" | "em" => markup.emphasis(&inline(body, markup, ctx)),
        "br" => "\n".to_string(),
        _ => inline(body, markup, ctx),
    }
}

/// A `cref` target: linked when the dictionary knows it, code otherwise.
fn reference(target: &str, markup: &impl Markup, ctx: &RenderContext<'_>) -> String {
    let translated = ctx.names.translate(target, true);
    if translated.contains(LINK_MARKER) {
        expand_links(&translated, markup, ctx)
    } else {
        markup.code(&translated)
    }
}

/// Turn `link::Name` markers produced by the normalizer into links.
pub(crate) fn expand_links(text: &str, markup: &impl Markup, ctx: &RenderContext<'_>) -> String {
    toc::expand_links(text, |name| {
        markup.link(name, &toc::link_target(name, ctx.base_url))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{TypeDictionary, TypeEntry};

    #[test]
    fn collapses_lines_and_blank_runs() {
        let text = "\n        First line.\n        Second line.\n\n\n        Next para.   \n    ";
        assert_eq!(
            collapse_whitespace(text),
            "First line.\nSecond line.\n\nNext para."
        );
        assert_eq!(collapse_whitespace("   \n  \n"), "");
    }

    #[test]
    fn signature_translates_types() {
        let mut dict = TypeDictionary::default();
        dict.add(TypeEntry {
            full_name: "Acme.Lib.Widget".to_string(),
            short_name: "Widget".to_string(),
            name_en: "Widget".to_string(),
            name_ru: "Виджет".to_string(),
        });
        let names = NameNormalizer::new(&dict);
        let params = vec![
            ParamDoc {
                name: "size".to_string(),
                type_name: "System.Int32".to_string(),
                optional: true,
            },
            ParamDoc {
                name: "owner".to_string(),
                type_name: "Acme.Lib.Widget".to_string(),
                optional: false,
            },
        ];
        assert_eq!(
            signature(&params, Some("System.String"), &names, true),
            "(size?: Число, owner: link::Виджет): Строка"
        );
        assert_eq!(signature(&[], None, &names, false), "()");
    }

    #[test]
    fn access_labels() {
        let label = |readable, writeable| access_label(PropertyAccess { readable, writeable });
        assert_eq!(label(true, true), "Чтение/Запись");
        assert_eq!(label(true, false), "Чтение");
        assert_eq!(label(false, true), "Запись");
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(create_renderer("pdf").is_err());
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("xml").unwrap().file_extension(), "xml");
    }
}
