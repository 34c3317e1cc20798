//! Markup (.html) tree builder
//!
//! Reads previously serialized card markup back into blocks and runs. Block
//! tags become blocks; inline formatting tags below them accumulate into the
//! style of each text run.

use crate::error::IngestError;
use cardcut_domain::traits::TreeBuilder;
use cardcut_domain::{Block, BlockKind, Rgb, Run, RunStyle, StructuredDocument};
use scraper::{ElementRef, Html};
use std::fs;
use std::path::Path;

const SKIP_TAGS: &[&str] = &["head", "script", "style", "noscript", "title", "template"];
const CONTAINER_TAGS: &[&str] = &[
    "html", "body", "main", "article", "section", "ul", "ol", "blockquote", "table", "tbody",
    "thead", "tr", "td", "th",
];

/// Builds a [`StructuredDocument`] from markup
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTreeBuilder;

impl HtmlTreeBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    /// Build from a markup string
    pub fn build_from_markup(&self, markup: &str) -> Result<StructuredDocument, IngestError> {
        let document = Html::parse_document(markup);
        let mut blocks = Vec::new();
        collect_blocks(document.root_element(), &mut blocks);

        if blocks.is_empty() && !markup.trim().is_empty() {
            return Err(IngestError::Markup("no block structure found".to_string()));
        }
        Ok(StructuredDocument::new(blocks))
    }
}

impl TreeBuilder for HtmlTreeBuilder {
    type Error = IngestError;

    fn supports(&self, path: &Path) -> bool {
        matches!(crate::extension_of(path).as_deref(), Some("html" | "htm"))
    }

    fn build_tree(&self, path: &Path) -> Result<StructuredDocument, IngestError> {
        let markup = fs::read_to_string(path)?;
        Ok(self
            .build_from_markup(&markup)?
            .with_source(path.display().to_string()))
    }
}

fn is_block_level(tag: &str) -> bool {
    BlockKind::from_tag(tag).is_some() || CONTAINER_TAGS.contains(&tag)
}

fn has_block_child(element: ElementRef<'_>) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| is_block_level(child.value().name()))
}

fn collect_blocks(element: ElementRef<'_>, blocks: &mut Vec<Block>) {
    let mut stray = Vec::new();

    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let tag = child_el.value().name();
            if SKIP_TAGS.contains(&tag) {
                continue;
            }
            match BlockKind::from_tag(tag) {
                Some(kind) if !has_block_child(child_el) => {
                    flush_stray(&mut stray, blocks);
                    let mut runs = Vec::new();
                    collect_runs(child_el, &RunStyle::default(), &mut runs);
                    blocks.push(Block { kind, runs });
                }
                Some(_) => {
                    flush_stray(&mut stray, blocks);
                    collect_blocks(child_el, blocks);
                }
                None if CONTAINER_TAGS.contains(&tag) => {
                    flush_stray(&mut stray, blocks);
                    collect_blocks(child_el, blocks);
                }
                None => {
                    let mut style = RunStyle::default();
                    apply_tag(&mut style, child_el);
                    collect_runs(child_el, &style, &mut stray);
                }
            }
        } else if let Some(text) = child.value().as_text() {
            let text: &str = text;
            if !text.trim().is_empty() || !stray.is_empty() {
                stray.push(Run::plain(text));
            }
        }
    }

    flush_stray(&mut stray, blocks);
}

/// Inline content found directly under a container becomes its own paragraph
fn flush_stray(stray: &mut Vec<Run>, blocks: &mut Vec<Block>) {
    if stray.iter().any(|r| !r.text.trim().is_empty()) {
        blocks.push(Block::paragraph(std::mem::take(stray)));
    }
    stray.clear();
}

fn collect_runs(element: ElementRef<'_>, style: &RunStyle, runs: &mut Vec<Run>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text: &str = text;
            if !text.is_empty() {
                runs.push(Run::styled(text, style.clone()));
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if child_el.value().name() == "br" {
                runs.push(Run::styled("\n", style.clone()));
                continue;
            }
            let mut child_style = style.clone();
            apply_tag(&mut child_style, child_el);
            collect_runs(child_el, &child_style, runs);
        }
    }
}

fn apply_tag(style: &mut RunStyle, element: ElementRef<'_>) {
    let value = element.value();
    match value.name() {
        "strong" | "b" => style.bold = true,
        "em" | "i" => style.italic = true,
        "u" => style.underline = true,
        "mark" => {
            let color = value
                .attr("style")
                .and_then(|s| declaration(s, "background-color"))
                .unwrap_or("yellow");
            style.highlight = Some(color.to_string());
        }
        "span" => {
            if let Some(color) = value
                .attr("style")
                .and_then(|s| declaration(s, "color"))
                .and_then(parse_color)
            {
                style.color = Some(color);
            }
        }
        "a" => {
            if let Some(href) = value.attr("href") {
                style.hyperlink = Some(href.to_string());
            }
        }
        _ => {}
    }
}

/// Value of one declaration in an inline `style` attribute
fn declaration<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim().eq_ignore_ascii_case(property)).then(|| value.trim())
    })
}

/// Parse `rgb(r,g,b)` or `#rrggbb`
fn parse_color(value: &str) -> Option<Rgb> {
    if let Some(inner) = value
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = inner
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .ok()?;
        return match channels.as_slice() {
            [r, g, b] => Some(Rgb(*r, *g, *b)),
            _ => None,
        };
    }
    Rgb::from_hex(value)
}
