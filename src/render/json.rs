//! JSON renderer. Structured output for tooling integration.
//!
//! Serializes the document tree directly; nodes carry their `kind` tag and
//! signature `key`. Type names are left in their qualified form.

use crate::model::DocumentCollection;
use crate::render::{RenderContext, Renderer};
use anyhow::{Context, Result};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, docs: &DocumentCollection, _ctx: &RenderContext<'_>) -> Result<String> {
        let mut out =
            serde_json::to_string_pretty(docs).context("failed to serialize document tree")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::names::{NameNormalizer, TypeDictionary};
    use serde_json::Value;

    #[test]
    fn serializes_tagged_nodes() {
        let docs = DocumentCollection {
            libraries: vec![LibraryDoc {
                name: "Acme.Lib".to_string(),
                nodes: vec![DocNode::GlobalContext(GlobalContextDoc {
                    identity: Identity {
                        qualified_name: "Acme.Lib.FileOperations".to_string(),
                        name: "FileOperations".to_string(),
                        alias: "FileOperations".to_string(),
                    },
                    key: "T:Acme.Lib.FileOperations".to_string(),
                    category: "Работа с файлами".to_string(),
                    comment: None,
                    properties: Vec::new(),
                    methods: vec![MethodDoc {
                        identity: Identity {
                            qualified_name: "Acme.Lib.FileOperations.Copy".to_string(),
                            name: "КопироватьФайл".to_string(),
                            alias: "CopyFile".to_string(),
                        },
                        key: "M:Acme.Lib.FileOperations.Copy".to_string(),
                        params: Vec::new(),
                        return_type: None,
                        comment: None,
                    }],
                })],
            }],
        };
        let names = NameNormalizer::new(&TypeDictionary::default());
        let ctx = RenderContext {
            names: &names,
            base_url: "",
        };
        let out = JsonRenderer.render(&docs, &ctx).unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        let node = &json["libraries"][0]["nodes"][0];
        assert_eq!(node["kind"], "global-context");
        assert_eq!(node["category"], "Работа с файлами");
        assert_eq!(node["methods"][0]["key"], "M:Acme.Lib.FileOperations.Copy");
        assert!(node["methods"][0].get("return_type").is_none());
    }
}
