//! Legacy Word (`.doc`) decoder.
//!
//! Converts through headless LibreOffice and decodes the resulting DOCX.

use crate::core::config::DEFAULT_LIBREOFFICE_TIMEOUT_SECS;
use crate::core::mime::LEGACY_WORD_MIME_TYPE;
use crate::extraction::libreoffice::convert_doc_to_docx;
use crate::extractors::docx::decode_docx;
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::ExtractionResult;
use crate::Result;
use async_trait::async_trait;

pub struct LegacyWordExtractor {
    timeout_secs: u64,
}

impl LegacyWordExtractor {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_LIBREOFFICE_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl Default for LegacyWordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LegacyWordExtractor {
    fn name(&self) -> &str {
        "legacy-word-extractor"
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
        "Extracts text from legacy Word documents via LibreOffice"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

#[async_trait]
impl DocumentExtractor for LegacyWordExtractor {
    async fn extract_bytes(&self, content: &[u8], mime_type: &str, _context: &DecodeContext) -> Result<ExtractionResult> {
        let docx = convert_doc_to_docx(content, self.timeout_secs).await?;
        let (text, properties) = decode_docx(&docx)?;
        Ok(ExtractionResult::new(text, mime_type, properties))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &[LEGACY_WORD_MIME_TYPE]
    }
}
