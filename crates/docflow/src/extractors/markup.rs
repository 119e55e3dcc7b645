//! HTML and XML decoder.

use crate::Result;
use crate::core::mime::{HTML_MIME_TYPE, XML_MIME_TYPE};
use crate::extraction::markup::{MarkupKind, markup_text};
use crate::extraction::text::{decode_text, text_stats};
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, keys};
use async_trait::async_trait;

const XHTML_MIME_TYPE: &str = "application/xhtml+xml";
const TEXT_XML_MIME_TYPE: &str = "text/xml";

/// Extracts the text of HTML and XML documents without their markup.
///
/// Bytes are decoded the same way as plain text before parsing.
pub struct MarkupExtractor;

impl MarkupExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkupExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for MarkupExtractor {
    fn name(&self) -> &str {
        "markup-extractor"
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
        "Extracts text from HTML and XML documents"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

fn kind_of(mime_type: &str) -> MarkupKind {
    match mime_type.split(';').next().unwrap_or_default().trim() {
        HTML_MIME_TYPE | XHTML_MIME_TYPE => MarkupKind::Html,
        _ => MarkupKind::Xml,
    }
}

#[async_trait]
impl DocumentExtractor for MarkupExtractor {
    async fn extract_bytes(
        &self,
        content: &[u8],
        mime_type: &str,
        context: &DecodeContext,
    ) -> Result<ExtractionResult> {
        let decoded = decode_text(content, context.properties.get(keys::CONTENT_ENCODING));
        let markup = markup_text(&decoded.text, kind_of(mime_type))?;
        let stats = text_stats(&markup.text);

        let mut properties = markup.properties;
        properties.set(keys::CONTENT_ENCODING, decoded.encoding);
        properties.set(keys::LINE_COUNT, stats.lines.to_string());
        properties.set(keys::WORD_COUNT, stats.words.to_string());
        properties.set(keys::CHARACTER_COUNT, stats.characters.to_string());

        Ok(ExtractionResult::new(markup.text, mime_type, properties))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &[HTML_MIME_TYPE, XHTML_MIME_TYPE, XML_MIME_TYPE, TEXT_XML_MIME_TYPE]
    }
}
