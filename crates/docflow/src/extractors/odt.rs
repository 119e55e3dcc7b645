//! OpenDocument text decoder.

use crate::core::mime::{ODT_MIME_TYPE, OTT_MIME_TYPE};
use crate::extraction::office_metadata::extract_odt_properties;
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, PropertyBag};
use crate::{DocflowError, Result};
use async_trait::async_trait;
use roxmltree::{Document, Node};
use std::io::{Cursor, Read};

pub struct OdtExtractor;

impl OdtExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OdtExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OdtExtractor {
    fn name(&self) -> &str {
        "odt-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Extracts text and properties from OpenDocument text files"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

/// Inline text of a paragraph or heading.
fn inline_text(node: Node, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                out.push_str(text);
            }
            continue;
        }
        match child.tag_name().name() {
            "s" => {
                let count = child
                    .attributes()
                    .find(|attr| attr.name() == "c")
                    .and_then(|attr| attr.value().parse::<usize>().ok())
                    .unwrap_or(1);
                out.extend(std::iter::repeat_n(' ', count));
            }
            "tab" => out.push('\t'),
            "line-break" => out.push('\n'),
            "annotation" | "note-citation" => {}
            _ => inline_text(child, out),
        }
    }
}

fn block_text(parent: Node, lines: &mut Vec<String>) {
    for node in parent.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "h" | "p" => {
                let mut line = String::new();
                inline_text(node, &mut line);
                lines.push(line);
            }
            "table-row" => {
                let cells: Vec<String> = node
                    .children()
                    .filter(|c| c.has_tag_name("table-cell"))
                    .map(|cell| {
                        let mut cell_lines = Vec::new();
                        block_text(cell, &mut cell_lines);
                        cell_lines.join(" ")
                    })
                    .collect();
                lines.push(cells.join("\t"));
            }
            "list" | "list-item" | "list-header" | "section" | "table" | "table-header-rows" | "table-rows" => {
                block_text(node, lines)
            }
            _ => {}
        }
    }
}

fn content_text(content_xml: &str) -> Result<String> {
    let doc = Document::parse(content_xml)?;
    let mut lines = Vec::new();

    for body in doc.root_element().children().filter(|n| n.has_tag_name("body")) {
        for text in body.children().filter(|n| n.has_tag_name("text")) {
            block_text(text, &mut lines);
        }
    }

    Ok(lines.join("\n").trim().to_string())
}

pub(crate) fn decode_odt(bytes: &[u8]) -> Result<(String, PropertyBag)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut content_xml = String::new();
    archive
        .by_name("content.xml")
        .map_err(|e| DocflowError::parsing(format!("OpenDocument package has no content.xml: {}", e)))?
        .read_to_string(&mut content_xml)
        .map_err(|e| DocflowError::parsing(format!("Failed to read content.xml: {}", e)))?;

    let text = content_text(&content_xml)?;

    let mut properties = PropertyBag::new();
    match extract_odt_properties(&mut archive) {
        Ok(meta) => meta.into_properties(&mut properties),
        Err(e) => tracing::warn!(error = %e, "Skipping unreadable OpenDocument meta.xml"),
    }

    Ok((text, properties))
}

#[async_trait]
impl DocumentExtractor for OdtExtractor {
    async fn extract_bytes(&self, content: &[u8], mime_type: &str, _context: &DecodeContext) -> Result<ExtractionResult> {
        let (text, properties) = decode_odt(content)?;
        Ok(ExtractionResult::new(text, mime_type, properties))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &[ODT_MIME_TYPE, OTT_MIME_TYPE]
    }
}
