//! Heading anchors and link expansion shared by the Markdown and HTML
//! renderers.

use crate::names::LINK_MARKER;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}([\p{{L}}\p{{N}}_]+)", regex::escape(LINK_MARKER))).unwrap()
});

/// Generate a table-of-contents link for a heading.
pub fn render_toc_link(text: &str, base_url: &str) -> String {
    format!("[{}]({})", text, link_target(text, base_url))
}

/// Generate a TOC list item.
pub fn render_toc_item(title: &str, base_url: &str) -> String {
    format!("* {}", render_toc_link(title, base_url))
}

/// `#slug` of a heading, prefixed with `base_url` when one is configured.
pub fn link_target(heading: &str, base_url: &str) -> String {
    format!("{}#{}", base_url, github_slug(heading))
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, space, or hyphen
/// - replace spaces with hyphens
///
/// Cyrillic letters are alphanumeric and survive.
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Replace every `link::Name` in `text` with whatever `render` makes of `Name`.
pub fn expand_links(text: &str, render: impl Fn(&str) -> String) -> String {
    RE_LINK
        .replace_all(text, |caps: &Captures| render(&caps[1]))
        .into_owned()
}
