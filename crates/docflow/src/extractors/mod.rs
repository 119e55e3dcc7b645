//! Built-in decoders.
//!
//! [`default_registry`] builds a [`DecoderRegistry`] holding every decoder
//! enabled by the crate's features. Callers that want a different set start
//! from [`DecoderRegistry::new`] and register their own.

use crate::Result;
use crate::core::config::PipelineConfig;
use crate::plugins::DecoderRegistry;
use std::sync::Arc;

mod fallback;
mod rtf;
mod text;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "xml")]
mod markup;

#[cfg(feature = "office")]
mod doc;
#[cfg(feature = "office")]
pub(crate) mod docx;
#[cfg(feature = "office")]
mod odt;

pub use fallback::FallbackExtractor;
pub use rtf::{RtfDocument, RtfExtractor, parse_rtf};
pub use text::PlainTextExtractor;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "xml")]
pub use markup::MarkupExtractor;

#[cfg(feature = "office")]
pub use doc::LegacyWordExtractor;
#[cfg(feature = "office")]
pub use docx::DocxExtractor;
#[cfg(feature = "office")]
pub use odt::OdtExtractor;

/// Register every built-in decoder with `registry`.
pub fn register_default_extractors(registry: &mut DecoderRegistry, config: &PipelineConfig) -> Result<()> {
    registry.register(Arc::new(PlainTextExtractor::new()))?;
    registry.register(Arc::new(RtfExtractor::new()))?;

    #[cfg(feature = "xml")]
    registry.register(Arc::new(MarkupExtractor::new()))?;

    #[cfg(feature = "pdf")]
    registry.register(Arc::new(PdfExtractor::new()))?;

    #[cfg(feature = "office")]
    {
        registry.register(Arc::new(DocxExtractor::new()))?;
        registry.register(Arc::new(OdtExtractor::new()))?;
        registry.register(Arc::new(LegacyWordExtractor::with_timeout(config.libreoffice_timeout_secs)))?;
    }

    #[cfg(not(feature = "office"))]
    let _ = config;

    Ok(())
}

/// A registry with every built-in decoder.
pub fn default_registry(config: &PipelineConfig) -> Result<DecoderRegistry> {
    let mut registry = DecoderRegistry::new();
    register_default_extractors(&mut registry, config)?;
    Ok(registry)
}
