//! Word-processor (.docx) tree builder
//!
//! Paragraphs come from the typed `docx-rs` document; run formatting and
//! hyperlink targets are read from the serialized form of each paragraph,
//! which carries the run properties and resolved link paths.

use crate::error::IngestError;
use cardcut_domain::traits::TreeBuilder;
use cardcut_domain::{Block, Rgb, Run, RunStyle, StructuredDocument};
use docx_rs::{read_docx, DocumentChild};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Builds a [`StructuredDocument`] from a `.docx` package
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTreeBuilder;

impl DocxTreeBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    /// Build from the raw bytes of a `.docx` package
    pub fn build_from_bytes(&self, bytes: &[u8]) -> Result<StructuredDocument, IngestError> {
        let docx = read_docx(bytes).map_err(|e| IngestError::Docx(e.to_string()))?;

        let mut blocks = Vec::new();
        for child in docx.document.children.iter() {
            // Tables, section properties and bookmarks carry no card text
            if let DocumentChild::Paragraph(para) = child {
                let value = serde_json::to_value(para)
                    .map_err(|e| IngestError::Docx(format!("paragraph serialization: {}", e)))?;
                let mut runs = Vec::new();
                collect_runs(&value, None, &mut runs);
                blocks.push(Block::paragraph(runs));
            }
        }

        debug!("Built {} paragraphs from docx package", blocks.len());
        Ok(StructuredDocument::new(blocks))
    }
}

impl TreeBuilder for DocxTreeBuilder {
    type Error = IngestError;

    fn supports(&self, path: &Path) -> bool {
        crate::extension_of(path).as_deref() == Some("docx")
    }

    fn build_tree(&self, path: &Path) -> Result<StructuredDocument, IngestError> {
        let bytes = fs::read(path)?;
        Ok(self
            .build_from_bytes(&bytes)?
            .with_source(path.display().to_string()))
    }
}

/// Walk a serialized paragraph collecting runs in reading order
///
/// Any object with a non-empty string `path` opens a hyperlink scope for the
/// runs below it.
fn collect_runs(value: &Value, link: Option<&str>, runs: &mut Vec<Run>) {
    match value {
        Value::Object(map) => {
            if map.contains_key("runProperty") {
                if let Some(run) = run_from_json(map, link) {
                    runs.push(run);
                }
                return;
            }
            let link = map
                .get("path")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .or(link);
            for (key, child) in map {
                if key == "property" {
                    continue;
                }
                collect_runs(child, link, runs);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_runs(item, link, runs);
            }
        }
        _ => {}
    }
}

fn run_from_json(run: &Map<String, Value>, link: Option<&str>) -> Option<Run> {
    let mut text = String::new();
    if let Some(children) = run.get("children").and_then(Value::as_array) {
        for child in children {
            match child.get("type").and_then(Value::as_str) {
                Some("text") => {
                    let data = child.get("data").unwrap_or(child);
                    if let Some(t) = data.get("text").and_then(Value::as_str) {
                        text.push_str(t);
                    }
                }
                Some("tab") => text.push('\t'),
                _ => {}
            }
        }
    }
    if text.is_empty() {
        return None;
    }

    let props = run.get("runProperty");
    let prop = |name: &'static str| property(props, name);

    let style = RunStyle {
        bold: flag(prop("bold")),
        italic: flag(prop("italic")),
        underline: value_str(prop("underline")).is_some_and(|u| u != "none"),
        highlight: value_str(prop("highlight"))
            .filter(|h| *h != "none")
            .map(str::to_string),
        color: value_str(prop("color")).and_then(Rgb::from_hex),
        hyperlink: link.map(str::to_string),
    };

    Some(Run::styled(text, style))
}

fn property<'a>(props: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    props.and_then(|p| p.get(name))
}

/// A toggle property, serialized either as a bare bool or as `{"val": bool}`
fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Object(map)) => map.get("val").and_then(Value::as_bool).unwrap_or(true),
        _ => false,
    }
}

/// A valued property, serialized either as a bare string or as `{"val": "..."}`
fn value_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Object(map)) => map.get("val").and_then(Value::as_str),
        _ => None,
    }
}
