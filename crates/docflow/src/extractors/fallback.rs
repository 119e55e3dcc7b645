//! Decoder of last resort.

use crate::Result;
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, PropertyBag};
use async_trait::async_trait;

/// Used for media types no other decoder claims.
///
/// Produces no text, so conversion reports an empty result, while the
/// metadata pipeline still records the detected type and resource name.
pub struct FallbackExtractor;

impl FallbackExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for FallbackExtractor {
    fn name(&self) -> &str {
        "fallback-extractor"
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
        "Reports no text for unsupported media types"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

#[async_trait]
impl DocumentExtractor for FallbackExtractor {
    async fn extract_bytes(&self, content: &[u8], mime_type: &str, _context: &DecodeContext) -> Result<ExtractionResult> {
        tracing::debug!(mime_type, bytes = content.len(), "No decoder for media type");
        Ok(ExtractionResult::new(String::new(), mime_type, PropertyBag::new()))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &[]
    }

    fn priority(&self) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_yields_no_text() {
        let result = FallbackExtractor::new()
            .extract_bytes(&[0x00, 0x01, 0x02], "application/octet-stream", &DecodeContext::default())
            .await
            .unwrap();
        assert!(result.content.is_empty());
        assert!(result.properties.is_empty());
        assert_eq!(result.mime_type, "application/octet-stream");
    }
}
