//! Conversion and metadata pipelines.
//!
//! Both run the same chain on a [`FlowRecord`]: a size check, media type
//! detection over the record's content stream, then bounded extraction. The
//! conversion pipeline turns a success into a text record; the metadata
//! pipeline into an attributes-only companion record.

use crate::core::config::{ExtractionLimits, PipelineConfig};
use crate::core::engine::{ExtractedContent, ExtractionEngine, ExtractionOutcome, FailureReason};
use crate::core::mime::{MediaTypeDetector, OCTET_STREAM_MIME_TYPE};
use crate::core::record::{FlowRecord, attributes};
use crate::extractors::default_registry;
use crate::plugins::DecoderRegistry;
use crate::types::MediaTypeDescriptor;
use crate::{DocflowError, Result};
use once_cell::sync::Lazy;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Extension given to converted text records.
pub const TEXT_EXTENSION: &str = ".txt";

static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime for synchronous pipeline calls")
});

fn default_concurrency() -> usize {
    num_cpus::get() * 2
}

/// Output of [`ConversionPipeline::run`].
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub outcome: ExtractionOutcome,
    /// Text record derived from the source; present only on success.
    pub artifact: Option<FlowRecord>,
}

/// Output of [`MetadataPipeline::run`].
#[derive(Debug, Clone)]
pub struct MetadataResult {
    pub outcome: ExtractionOutcome,
    /// Attributes-only record derived from the source; present only on success.
    pub companion: Option<FlowRecord>,
}

/// Outcome of the steps shared by both pipelines.
struct Extraction {
    descriptor: MediaTypeDescriptor,
    outcome: ExtractionOutcome,
}

#[derive(Debug, Clone)]
struct Stages {
    detector: Arc<MediaTypeDetector>,
    engine: ExtractionEngine,
    max_concurrent: usize,
}

impl Stages {
    fn new(detector: Arc<MediaTypeDetector>, registry: Arc<DecoderRegistry>) -> Self {
        Self {
            detector,
            engine: ExtractionEngine::new(registry),
            max_concurrent: default_concurrency(),
        }
    }

    fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let registry = default_registry(config)?;
        let mut stages = Self::new(
            Arc::new(MediaTypeDetector::with_prefix_len(config.detection_prefix_bytes)),
            Arc::new(registry),
        );
        if let Some(max) = config.max_concurrent_extractions {
            stages.max_concurrent = max;
        }
        Ok(stages)
    }

    async fn extract(
        &self,
        doc: &FlowRecord,
        limits: &ExtractionLimits,
        filename_hint: Option<&str>,
        metadata_only: bool,
    ) -> Extraction {
        let uuid = doc.id();
        let size = doc.size();
        let hint = filename_hint.or_else(|| doc.filename());

        if let Err(reason) = ExtractionEngine::check_size(size, limits) {
            tracing::warn!(%uuid, size, limit = limits.max_input_bytes, "Document exceeds size limit");
            return Extraction::failed(reason);
        }

        let reader = match doc.open() {
            Ok(reader) => reader,
            Err(e) => {
                tracing::error!(%uuid, error = %e, "Cannot open document content");
                return Extraction::failed(FailureReason::detection(e.to_string()));
            }
        };

        let (descriptor, stream) = match self.detector.detect(reader, hint) {
            Ok(detected) => detected,
            Err(e) => {
                tracing::error!(%uuid, error = %e, "Media type detection failed");
                return Extraction::failed(FailureReason::detection(e.to_string()));
            }
        };

        if descriptor.file_extension.is_none() {
            tracing::warn!(%uuid, mime_type = %descriptor.type_identifier, "No file extension known for media type");
        }

        let outcome = if metadata_only {
            self.engine
                .extract_metadata(stream, size, &descriptor, limits, hint)
                .await
        } else {
            self.engine.extract(stream, size, &descriptor, limits, hint).await
        };

        if let ExtractionOutcome::Failure(reason) = &outcome {
            tracing::error!(%uuid, mime_type = %descriptor.type_identifier, reason = %reason, "Extraction failed");
        }

        Extraction { descriptor, outcome }
    }
}

impl Extraction {
    fn failed(reason: FailureReason) -> Self {
        Self {
            descriptor: MediaTypeDescriptor::new(OCTET_STREAM_MIME_TYPE, None),
            outcome: reason.into(),
        }
    }
}

fn stamp_media_type(record: &mut FlowRecord, descriptor: &MediaTypeDescriptor) {
    record.put_attribute(attributes::MIME_TYPE, &descriptor.type_identifier);
    if let Some(extension) = &descriptor.file_extension {
        record.put_attribute(attributes::MIME_EXTENSION, extension);
    }
}

/// Converts documents to plain text records.
#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    stages: Stages,
}

impl ConversionPipeline {
    pub fn new(detector: Arc<MediaTypeDetector>, registry: Arc<DecoderRegistry>) -> Self {
        Self {
            stages: Stages::new(detector, registry),
        }
    }

    /// A pipeline with the built-in decoders, configured from `config`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            stages: Stages::from_config(config)?,
        })
    }

    /// Cap on documents processed at once by [`run_batch`](Self::run_batch).
    pub fn with_max_concurrency(mut self, max_concurrent: usize) -> Self {
        self.stages.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn engine(&self) -> &ExtractionEngine {
        &self.stages.engine
    }

    /// Convert one document.
    ///
    /// `filename_hint` assists detection and becomes the `resourceName`
    /// property; when `None`, the record's `filename` attribute is used.
    /// `doc` itself is never modified.
    pub async fn run(&self, doc: &FlowRecord, limits: &ExtractionLimits, filename_hint: Option<&str>) -> ConversionResult {
        let Extraction { descriptor, outcome } = self.stages.extract(doc, limits, filename_hint, false).await;

        let artifact = outcome
            .content()
            .map(|content| build_text_artifact(doc, &descriptor, content));

        ConversionResult { outcome, artifact }
    }

    /// Blocking form of [`run`](Self::run). Must not be called from within
    /// an async runtime.
    pub fn run_sync(&self, doc: &FlowRecord, limits: &ExtractionLimits, filename_hint: Option<&str>) -> ConversionResult {
        RUNTIME.block_on(self.run(doc, limits, filename_hint))
    }

    /// Convert many documents concurrently. Results keep the input order and
    /// are paired with their source record.
    pub async fn run_batch(
        &self,
        docs: Vec<FlowRecord>,
        limits: &ExtractionLimits,
    ) -> Result<Vec<(FlowRecord, ConversionResult)>> {
        let limits = Arc::new(limits.clone());
        run_concurrently(self.stages.max_concurrent, docs, move |doc| {
            let pipeline = self.clone();
            let limits = Arc::clone(&limits);
            async move {
                let result = pipeline.run(&doc, &limits, None).await;
                (doc, result)
            }
        })
        .await
    }
}

/// Build the text record for a successful conversion.
fn build_text_artifact(doc: &FlowRecord, descriptor: &MediaTypeDescriptor, content: &ExtractedContent) -> FlowRecord {
    let mut artifact = doc.derive().with_content(content.text.clone().into_bytes());
    stamp_media_type(&mut artifact, descriptor);

    if let (Some(filename), Some(extension)) = (doc.filename(), descriptor.file_extension.as_deref())
        && !filename.is_empty()
        && !extension.is_empty()
    {
        artifact.put_attribute(attributes::FILENAME, filename.replace(extension, TEXT_EXTENSION));
    }

    artifact.put_all_attributes(&content.attributes);
    artifact
}

/// Extracts document properties into companion records.
#[derive(Debug, Clone)]
pub struct MetadataPipeline {
    stages: Stages,
    limits: ExtractionLimits,
}

impl MetadataPipeline {
    /// A pipeline bounded by `limits`; pass [`ExtractionLimits::unbounded`]
    /// to read documents of any size.
    pub fn new(detector: Arc<MediaTypeDetector>, registry: Arc<DecoderRegistry>, limits: ExtractionLimits) -> Self {
        Self {
            stages: Stages::new(detector, registry),
            limits,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            stages: Stages::from_config(config)?,
            limits: config.metadata_limits(),
        })
    }

    pub fn with_max_concurrency(mut self, max_concurrent: usize) -> Self {
        self.stages.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn limits(&self) -> &ExtractionLimits {
        &self.limits
    }

    /// Extract the properties of one document.
    ///
    /// The companion shares the source content and keeps its filename.
    pub async fn run(&self, doc: &FlowRecord, filename_hint: Option<&str>) -> MetadataResult {
        let Extraction { descriptor, outcome } = self.stages.extract(doc, &self.limits, filename_hint, true).await;

        let companion = outcome.content().map(|content| {
            let mut companion = doc.derive();
            stamp_media_type(&mut companion, &descriptor);
            companion.put_all_attributes(&content.attributes);
            companion
        });

        MetadataResult { outcome, companion }
    }

    pub fn run_sync(&self, doc: &FlowRecord, filename_hint: Option<&str>) -> MetadataResult {
        RUNTIME.block_on(self.run(doc, filename_hint))
    }

    pub async fn run_batch(&self, docs: Vec<FlowRecord>) -> Result<Vec<(FlowRecord, MetadataResult)>> {
        run_concurrently(self.stages.max_concurrent, docs, move |doc| {
            let pipeline = self.clone();
            async move {
                let result = pipeline.run(&doc, None).await;
                (doc, result)
            }
        })
        .await
    }
}

async fn run_concurrently<T, F, Fut>(max_concurrent: usize, docs: Vec<FlowRecord>, mut task: F) -> Result<Vec<T>>
where
    T: Send + 'static,
    F: FnMut(FlowRecord) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    if docs.is_empty() {
        return Ok(Vec::new());
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();
    let total = docs.len();

    for (index, doc) in docs.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let work = task(doc);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| DocflowError::Other(format!("Batch semaphore closed: {}", e)))?;
            Ok::<_, DocflowError>((index, work.await))
        });
    }

    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, value) = joined.map_err(|e| DocflowError::Other(format!("Task panicked: {}", e)))??;
        results[index] = Some(value);
    }

    results
        .into_iter()
        .map(|slot| slot.ok_or_else(|| DocflowError::Other("Batch task produced no result".to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::keys;

    fn pipeline() -> ConversionPipeline {
        ConversionPipeline::from_config(&PipelineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_text_document_converts() {
        let doc = FlowRecord::new("plain words here").with_filename("note.txt");
        let result = pipeline().run(&doc, &ExtractionLimits::default(), None).await;

        let artifact = result.artifact.unwrap();
        assert_eq!(artifact.content(), Some(b"plain words here".as_slice()));
        assert_eq!(artifact.filename(), Some("note.txt"));
        assert_eq!(artifact.attribute(attributes::MIME_TYPE), Some("text/plain"));
        assert_eq!(artifact.attribute(attributes::MIME_EXTENSION), Some(".txt"));
        assert_eq!(artifact.attribute(keys::RESOURCE_NAME), Some("note.txt"));
        assert_eq!(artifact.parent_id(), Some(doc.id()));
    }

    #[tokio::test]
    async fn test_filename_rewrite_is_literal_replace() {
        let doc = FlowRecord::new(br"{\rtf1 Hello}".to_vec()).with_filename("a.rtf.b.rtf");
        let result = pipeline().run(&doc, &ExtractionLimits::default(), None).await;

        let artifact = result.artifact.unwrap();
        assert_eq!(artifact.filename(), Some("a.txt.b.txt"));
        assert_eq!(artifact.content(), Some(b"Hello".as_slice()));
    }

    #[tokio::test]
    async fn test_failure_has_no_artifact() {
        let doc = FlowRecord::new(vec![0u8; 64]).with_filename("blob.bin");
        let result = pipeline().run(&doc, &ExtractionLimits::default(), None).await;

        assert!(result.artifact.is_none());
        assert_eq!(result.outcome.failure(), Some(&FailureReason::EmptyResult));
    }

    #[tokio::test]
    async fn test_metadata_companion_keeps_content() {
        let metadata = MetadataPipeline::from_config(&PipelineConfig::default()).unwrap();
        let doc = FlowRecord::new(br"{\rtf1{\info{\title Plan}}Body}".to_vec()).with_filename("plan.rtf");

        let result = metadata.run(&doc, None).await;
        let companion = result.companion.unwrap();

        assert_eq!(companion.content(), doc.content());
        assert_eq!(companion.filename(), Some("plan.rtf"));
        assert_eq!(companion.attribute(keys::TITLE), Some("Plan"));
        assert_eq!(companion.attribute(attributes::MIME_TYPE), Some("application/rtf"));
    }

    #[test]
    fn test_run_sync() {
        let doc = FlowRecord::new("sync body").with_filename("s.txt");
        let result = pipeline().run_sync(&doc, &ExtractionLimits::default(), None);
        assert!(result.outcome.is_success());
    }

    #[tokio::test]
    async fn test_run_batch_preserves_order() {
        let docs: Vec<FlowRecord> = (0..8)
            .map(|i| FlowRecord::new(format!("document {}", i)).with_filename(format!("d{}.txt", i)))
            .collect();
        let ids: Vec<_> = docs.iter().map(FlowRecord::id).collect();

        let results = pipeline()
            .with_max_concurrency(3)
            .run_batch(docs, &ExtractionLimits::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 8);
        for (i, (doc, result)) in results.iter().enumerate() {
            assert_eq!(doc.id(), ids[i]);
            let artifact = result.artifact.as_ref().unwrap();
            assert_eq!(artifact.content(), Some(format!("document {}", i).as_bytes()));
        }
    }

    #[tokio::test]
    async fn test_run_batch_empty() {
        let results = pipeline().run_batch(Vec::new(), &ExtractionLimits::default()).await.unwrap();
        assert!(results.is_empty());
    }
}
