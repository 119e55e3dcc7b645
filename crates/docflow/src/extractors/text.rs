//! Plain text decoder.

use crate::Result;
use crate::extraction::text::{decode_text, text_stats};
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, PropertyBag, keys};
use async_trait::async_trait;

/// Decodes any `text/*` content, plus JSON, to its characters.
///
/// HTML and XML have exact registrations with the markup decoder when the
/// `xml` feature is enabled; without it they pass through here unparsed.
///
/// The charset comes from a byte-order mark, a `Content-Encoding` property
/// set by the caller, or detection, in that order.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain-text-extractor"
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
        "Decodes plain text in any detected charset"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_bytes(
        &self,
        content: &[u8],
        mime_type: &str,
        context: &DecodeContext,
    ) -> Result<ExtractionResult> {
        let decoded = decode_text(content, context.properties.get(keys::CONTENT_ENCODING));
        let stats = text_stats(&decoded.text);

        let mut properties = PropertyBag::new();
        properties.set(keys::CONTENT_ENCODING, decoded.encoding);
        properties.set(keys::LINE_COUNT, stats.lines.to_string());
        properties.set(keys::WORD_COUNT, stats.words.to_string());
        properties.set(keys::CHARACTER_COUNT, stats.characters.to_string());

        Ok(ExtractionResult::new(decoded.text, mime_type, properties))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/plain", "text/*", "application/json"]
    }
}
