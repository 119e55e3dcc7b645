//! PDF decoder.

use crate::Result;
use crate::core::mime::PDF_MIME_TYPE;
use crate::pdf::error::PdfError;
use crate::pdf::{extract_metadata, extract_text, load_document};
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, PropertyBag};
use crate::DocflowError;
use async_trait::async_trait;

/// Extracts the text layer and the `/Info` properties of a PDF.
///
/// Encrypted files are opened with the password from the decode context;
/// parsing runs on the blocking pool.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PdfExtractor {
    fn name(&self) -> &str {
        "pdf-extractor"
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
        "Extracts text and document information from PDF files"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract_bytes(&self, content: &[u8], mime_type: &str, context: &DecodeContext) -> Result<ExtractionResult> {
        let bytes = content.to_vec();
        let password = context.password();

        let (text, properties) = tokio::task::spawn_blocking(move || -> std::result::Result<_, PdfError> {
            let loaded = load_document(&bytes, password.as_ref().map(|p| p.expose()))?;
            let text = extract_text(&loaded.document)?;

            let mut properties = PropertyBag::new();
            extract_metadata(&loaded)?.into_properties(&mut properties);
            Ok((text, properties))
        })
        .await
        .map_err(|e| DocflowError::parsing(format!("PDF decoding task failed: {}", e)))??;

        Ok(ExtractionResult::new(text, mime_type, properties))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &[PDF_MIME_TYPE]
    }

    fn accepts_password(&self) -> bool {
        true
    }
}
