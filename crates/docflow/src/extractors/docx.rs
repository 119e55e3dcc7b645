//! DOCX decoder using docx-lite, with package properties from `docProps/`.

use crate::core::mime::{DOCM_MIME_TYPE, DOCX_MIME_TYPE, DOTX_MIME_TYPE};
use crate::extraction::office_metadata::{extract_app_properties, extract_core_properties};
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, PropertyBag};
use crate::{DocflowError, Result};
use async_trait::async_trait;
use std::io::Cursor;

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DocxExtractor {
    fn name(&self) -> &str {
        "docx-extractor"
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
        "Extracts text and package properties from Word documents"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

/// Text and properties of a DOCX package.
///
/// Unreadable `docProps` parts are logged and skipped; only an unreadable
/// document body fails the decode.
pub(crate) fn decode_docx(bytes: &[u8]) -> Result<(String, PropertyBag)> {
    let document = docx_lite::parse_document(Cursor::new(bytes))
        .map_err(|e| DocflowError::parsing(format!("DOCX parsing failed: {}", e)))?;
    let text = document.extract_text();

    let mut properties = PropertyBag::new();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    match extract_core_properties(&mut archive) {
        Ok(core) => core.into_properties(&mut properties),
        Err(e) => tracing::warn!(error = %e, "Skipping unreadable DOCX core properties"),
    }
    match extract_app_properties(&mut archive) {
        Ok(app) => app.into_properties(&mut properties),
        Err(e) => tracing::warn!(error = %e, "Skipping unreadable DOCX app properties"),
    }

    Ok((text, properties))
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract_bytes(&self, content: &[u8], mime_type: &str, _context: &DecodeContext) -> Result<ExtractionResult> {
        let (text, properties) = decode_docx(content)?;
        Ok(ExtractionResult::new(text, mime_type, properties))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &[DOCX_MIME_TYPE, DOCM_MIME_TYPE, DOTX_MIME_TYPE]
    }
}
