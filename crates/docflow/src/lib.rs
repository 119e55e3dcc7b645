//! Docflow - document to text conversion for record-oriented data flows.
//!
//! Docflow takes a [`FlowRecord`] holding an arbitrary binary document,
//! detects its media type from content, and either converts it to a plain
//! text record or extracts its properties into record attributes.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docflow::{ConversionPipeline, ExtractionLimits, FlowRecord, PipelineConfig};
//!
//! # async fn example() -> docflow::Result<()> {
//! let pipeline = ConversionPipeline::from_config(&PipelineConfig::default())?;
//! let doc = FlowRecord::from_path("report.pdf")?;
//! let result = pipeline.run(&doc, &ExtractionLimits::default(), None).await;
//! if let Some(text) = result.artifact {
//!     println!("{}", String::from_utf8_lossy(text.content().unwrap_or_default()));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Detection** (`core::mime`): magic bytes, container inspection and filename hints
//! - **Decoders** (`extractors`): one per format family, looked up in a [`DecoderRegistry`]
//! - **Engine** (`core::engine`): size limits, password handling and the text write cap
//! - **Pipelines** (`core::pipeline`): conversion and metadata, single and batch
//! - **Routing** (`core::routing`): original, success and failure relationships
//!
//! # Features
//!
//! - `pdf`: PDF text and metadata via lopdf, including password protected files
//! - `office`: DOCX and ODT decoding, legacy `.doc` through LibreOffice

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extraction;
pub mod extractors;
pub mod plugins;
pub mod types;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use error::{DocflowError, Result};
pub use types::{AttributeMap, ExtractionResult, MediaTypeDescriptor, PropertyBag, keys};

pub use core::config::{DataSize, ExtractionLimits, PipelineConfig, SecretString};
pub use core::engine::{ExtractedContent, ExtractionEngine, ExtractionOutcome, FailureReason};
pub use core::mime::{
    DOCX_MIME_TYPE, LEGACY_WORD_MIME_TYPE, MediaTypeDetector, OCTET_STREAM_MIME_TYPE, ODT_MIME_TYPE, PDF_MIME_TYPE,
    PLAIN_TEXT_MIME_TYPE, RTF_MIME_TYPE, extension_for_mime, type_for_filename,
};
pub use core::pipeline::{ConversionPipeline, ConversionResult, MetadataPipeline, MetadataResult};
pub use core::record::{FlowRecord, attributes};
pub use core::routing::{RecordingRouter, Relationship, ResultRouter, route_conversion, route_metadata};

pub use extractors::{default_registry, register_default_extractors};
pub use plugins::{DecodeContext, DecoderRegistry, DocumentExtractor, PasswordProvider, Plugin};
