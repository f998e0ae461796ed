//! HTML renderer. Standalone HTML page with semantic markup.

use crate::comments::CommentBlock;
use crate::model::*;
use crate::render::{access_label, expand_links, render_rich, signature, Markup, RenderContext, Renderer};
use crate::toc;
use anyhow::Result;

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, docs: &DocumentCollection, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        let title = docs
            .libraries
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("<title>{}</title>\n", html_escape(&title)));
        out.push_str("<style>\n");
        out.push_str("body { font-family: system-ui, sans-serif; max-width: 48em; margin: 2em auto; padding: 0 1em; }\n");
        out.push_str("code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }\n");
        out.push_str("pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }\n");
        out.push_str("dt { font-weight: bold; margin-top: 0.5em; }\n");
        out.push_str("dd { margin-left: 1.5em; }\n");
        out.push_str(".tag { display: inline-block; font-size: 0.75em; padding: 0.1em 0.4em; border-radius: 3px; margin-left: 0.5em; background: #e0e0e0; }\n");
        out.push_str("</style>\n");
        out.push_str("</head>\n<body>\n");

        for library in &docs.libraries {
            render_library(&mut out, library, ctx);
        }

        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

struct Html;

impl Markup for Html {
    fn text(&self, text: &str) -> String {
        html_escape(text)
    }

    fn code(&self, text: &str) -> String {
        format!("<code>{}</code>", html_escape(text))
    }

    fn strong(&self, text: &str) -> String {
        format!("<strong>{}</strong>", text)
    }

    fn emphasis(&self, text: &str) -> String {
        format!("<em>{}</em>", text)
    }

    fn paragraph(&self, text: &str) -> String {
        format!("\n\n{}\n\n", text)
    }

    fn link(&self, label: &str, target: &str) -> String {
        format!("<a href=\"{}\">{}</a>", html_escape(target), html_escape(label))
    }
}

fn render_library(out: &mut String, library: &LibraryDoc, ctx: &RenderContext<'_>) {
    out.push_str(&format!("<h1>{}</h1>\n", html_escape(&library.name)));

    // Index
    if !library.nodes.is_empty() {
        out.push_str("<h2>Содержание</h2>\n<ul>\n");
        for node in &library.nodes {
            let title = heading_of(node);
            out.push_str(&format!(
                "  <li><a href=\"{}\">{}</a></li>\n",
                html_escape(&toc::link_target(title, ctx.base_url)),
                html_escape(title)
            ));
        }
        out.push_str("</ul>\n");
    }

    for node in &library.nodes {
        let title = heading_of(node);
        out.push_str(&format!(
            "<h2 id=\"{}\" data-key=\"{}\">{}",
            html_escape(&toc::github_slug(title)),
            html_escape(node.key()),
            html_escape(title)
        ));
        if let DocNode::Enum(_) = node {
            out.push_str(" <span class=\"tag\">enum</span>");
        }
        out.push_str("</h2>\n");
        out.push_str(&format!(
            "<p><code>{}</code></p>\n",
            html_escape(&node.identity().qualified_name)
        ));
        render_comment(out, node.comment(), ctx);

        match node {
            DocNode::GlobalContext(g) => {
                render_properties(out, &g.properties, ctx);
                render_methods(out, &g.methods, ctx);
            }
            DocNode::Class(c) => {
                render_properties(out, &c.properties, ctx);
                render_methods(out, &c.methods, ctx);
                render_constructors(out, c, ctx);
            }
            DocNode::Enum(e) => render_values(out, &e.values, ctx),
        }
    }
}

fn heading_of(node: &DocNode) -> &str {
    match node {
        DocNode::GlobalContext(g) => &g.category,
        DocNode::Class(c) => &c.identity.name,
        DocNode::Enum(e) => &e.identity.name,
    }
}

fn render_properties(out: &mut String, properties: &[PropertyDoc], ctx: &RenderContext<'_>) {
    if properties.is_empty() {
        return;
    }
    out.push_str("<h3>Свойства</h3>\n<dl>\n");
    for prop in properties {
        out.push_str(&format!(
            "  <dt>{} <code>{}</code> <span class=\"tag\">{}</span></dt>\n",
            html_escape(&prop.identity.name),
            html_escape(&prop.identity.alias),
            access_label(prop.access)
        ));
        if let Some(text) = description(prop.comment.as_ref(), ctx) {
            out.push_str(&format!("  <dd>{}</dd>\n", text));
        }
    }
    out.push_str("</dl>\n");
}

fn render_methods(out: &mut String, methods: &[MethodDoc], ctx: &RenderContext<'_>) {
    if methods.is_empty() {
        return;
    }
    out.push_str("<h3>Методы</h3>\n");
    for method in methods {
        out.push_str(&format!(
            "<h4>{} / {}</h4>\n",
            html_escape(&method.identity.name),
            html_escape(&method.identity.alias)
        ));
        let sig = signature(&method.params, method.return_type.as_deref(), ctx.names, true);
        out.push_str(&format!(
            "<pre>{}{}</pre>\n",
            html_escape(&method.identity.name),
            expand_links(&html_escape(&sig), &Html, ctx)
        ));
        render_comment(out, method.comment.as_ref(), ctx);
    }
}

fn render_constructors(out: &mut String, class: &ClassDoc, ctx: &RenderContext<'_>) {
    if class.constructors.is_empty() {
        return;
    }
    out.push_str("<h3>Конструкторы</h3>\n");
    for ctor in &class.constructors {
        out.push_str(&format!("<h4>{}</h4>\n", html_escape(&ctor.name)));
        let sig = signature(&ctor.params, None, ctx.names, true);
        out.push_str(&format!(
            "<pre>Новый {}{}</pre>\n",
            html_escape(&class.identity.name),
            expand_links(&html_escape(&sig), &Html, ctx)
        ));
        render_comment(out, ctor.comment.as_ref(), ctx);
    }
}

fn render_values(out: &mut String, values: &[EnumValueDoc], ctx: &RenderContext<'_>) {
    if values.is_empty() {
        return;
    }
    out.push_str("<h3>Значения</h3>\n<dl>\n");
    for value in values {
        out.push_str(&format!(
            "  <dt>{} <code>{}</code></dt>\n",
            html_escape(&value.identity.name),
            html_escape(&value.identity.alias)
        ));
        if let Some(text) = description(value.comment.as_ref(), ctx) {
            out.push_str(&format!("  <dd>{}</dd>\n", text));
        }
    }
    out.push_str("</dl>\n");
}

fn description(comment: Option<&CommentBlock>, ctx: &RenderContext<'_>) -> Option<String> {
    let text = render_rich(comment?.description.as_ref()?, &Html, ctx);
    (!text.is_empty()).then(|| paragraphs(&text))
}

/// Blank-line separated blocks become `<p>` elements.
fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br>\n")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_comment(out: &mut String, comment: Option<&CommentBlock>, ctx: &RenderContext<'_>) {
    let Some(comment) = comment else {
        return;
    };
    if let Some(text) = description(Some(comment), ctx) {
        out.push_str(&text);
        out.push('\n');
    }

    // Parameters
    if !comment.params.is_empty() {
        out.push_str("<h5>Параметры</h5>\n<dl>\n");
        for param in &comment.params {
            out.push_str(&format!("  <dt><code>{}</code></dt>\n", html_escape(&param.name)));
            out.push_str(&format!("  <dd>{}</dd>\n", render_rich(&param.text, &Html, ctx)));
        }
        out.push_str("</dl>\n");
    }

    if let Some(ref returns) = comment.returns {
        out.push_str("<h5>Возвращаемое значение</h5>\n");
        out.push_str(&format!("<p>{}</p>\n", render_rich(returns, &Html, ctx)));
    }

    for tag in &comment.tags {
        let text = render_rich(&tag.text, &Html, ctx);
        if tag.tag == "example" {
            out.push_str(&format!("<pre><code class=\"language-bsl\">{}</code></pre>\n", text));
        } else {
            out.push_str(&format!("<p><em>{}</em>: {}</p>\n", html_escape(&tag.tag), text));
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{NameNormalizer, TypeDictionary};

    fn docs() -> DocumentCollection {
        let value = |name: &str, alias: &str| EnumValueDoc {
            identity: Identity {
                qualified_name: format!("Acme.Lib.Status.{alias}"),
                name: name.to_string(),
                alias: alias.to_string(),
            },
            key: format!("P:Acme.Lib.Status.{alias}"),
            comment: None,
        };
        DocumentCollection {
            libraries: vec![LibraryDoc {
                name: "Acme.Lib".to_string(),
                nodes: vec![DocNode::Enum(EnumDoc {
                    identity: Identity {
                        qualified_name: "Acme.Lib.Status".to_string(),
                        name: "Статус".to_string(),
                        alias: "Status".to_string(),
                    },
                    key: "T:Acme.Lib.Status".to_string(),
                    enum_kind: EnumKind::System,
                    comment: None,
                    values: vec![value("Активен", "Active"), value("Закрыт", "Closed")],
                })],
            }],
        }
    }

    #[test]
    fn renders_standalone_page() {
        let names = NameNormalizer::new(&TypeDictionary::default());
        let ctx = RenderContext {
            names: &names,
            base_url: "",
        };
        let out = HtmlRenderer.render(&docs(), &ctx).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<title>Acme.Lib</title>"));
        assert!(out.contains("<li><a href=\"#статус\">Статус</a></li>"));
        assert!(out.contains("<h2 id=\"статус\" data-key=\"T:Acme.Lib.Status\">Статус <span class=\"tag\">enum</span></h2>"));
        assert!(out.contains("<dt>Закрыт <code>Closed</code></dt>"));
        assert!(out.trim_end().ends_with("</html>"));
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        assert_eq!(paragraphs("a\nb\n\nc"), "<p>a<br>\nb</p>\n<p>c</p>");
    }

    #[test]
    fn escape_html() {
        assert_eq!(html_escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
