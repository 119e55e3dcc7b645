//! Core orchestration.
//!
//! - [`mime`]: content-based media type detection
//! - [`engine`]: bounded extraction through the decoder registry
//! - [`pipeline`]: the conversion and metadata pipelines over [`FlowRecord`]s
//! - [`routing`]: delivery of results to original/success/failure
//! - [`config`]: limits and pipeline configuration

pub mod config;
pub mod engine;
pub mod mime;
pub mod pipeline;
pub mod record;
pub mod routing;

pub use config::{DataSize, ExtractionLimits, PipelineConfig, SecretString};
pub use engine::{ExtractedContent, ExtractionEngine, ExtractionOutcome, FailureReason, TextSink};
pub use mime::{MediaTypeDetector, extension_for_mime, type_for_filename};
pub use pipeline::{ConversionPipeline, ConversionResult, MetadataPipeline, MetadataResult};
pub use record::FlowRecord;
pub use routing::{RecordingRouter, Relationship, ResultRouter, route_conversion, route_metadata};
