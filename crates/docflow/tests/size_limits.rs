//! Size bound integration tests.

mod helpers;

use docflow::{
    ConversionPipeline, DecoderRegistry, ExtractionEngine, ExtractionLimits, FailureReason, FlowRecord,
    MediaTypeDescriptor, MediaTypeDetector, RecordingRouter, Relationship, route_conversion,
};
use helpers::*;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const ONE_MIB: i64 = 1_048_576;

struct TrackingReader {
    touched: Arc<AtomicBool>,
}

impl Read for TrackingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        self.touched.store(true, Ordering::SeqCst);
        Ok(0)
    }
}

fn counting_pipeline() -> (ConversionPipeline, Arc<CountingExtractor>) {
    let counting = CountingExtractor::new("counting", &["text/plain", "application/octet-stream"], "text");
    let mut registry = DecoderRegistry::new();
    registry.register(counting.clone()).unwrap();
    let pipeline = ConversionPipeline::new(Arc::new(MediaTypeDetector::new()), Arc::new(registry));
    (pipeline, counting)
}

#[tokio::test]
async fn test_two_megabyte_document_is_rejected() {
    let (pipeline, counting) = counting_pipeline();
    let source = FlowRecord::new(vec![b'a'; 2 * 1024 * 1024]).with_filename("huge.txt");

    let result = pipeline.run(&source, &ExtractionLimits::new(ONE_MIB), None).await;

    assert_eq!(
        result.outcome.failure(),
        Some(&FailureReason::ExceedsSizeLimit {
            size: 2 * 1024 * 1024,
            limit: ONE_MIB as u64,
        })
    );
    assert_eq!(counting.calls(), 0, "no decoder may run for an oversized document");

    let mut router = RecordingRouter::new();
    assert_eq!(route_conversion(&mut router, &source, result).unwrap(), Relationship::Failure);
    assert_eq!(router.records(Relationship::Failure)[0].id(), source.id());
}

#[tokio::test]
async fn test_oversized_stream_is_never_read() {
    let engine = ExtractionEngine::new(Arc::new(DecoderRegistry::new()));
    let touched = Arc::new(AtomicBool::new(false));
    let reader = TrackingReader {
        touched: Arc::clone(&touched),
    };

    let outcome = engine
        .extract(
            reader,
            2 * 1024 * 1024,
            &MediaTypeDescriptor::new("text/plain", Some(".txt".to_string())),
            &ExtractionLimits::new(ONE_MIB),
            Some("huge.txt"),
        )
        .await;

    assert!(matches!(outcome.failure(), Some(FailureReason::ExceedsSizeLimit { .. })));
    assert!(!touched.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_document_at_limit_is_accepted() {
    let (pipeline, counting) = counting_pipeline();
    let source = FlowRecord::new(vec![b'a'; 1024]).with_filename("exact.txt");

    let result = pipeline.run(&source, &ExtractionLimits::new(1024), None).await;

    assert!(result.outcome.is_success());
    assert_eq!(counting.calls(), 1);
}

#[tokio::test]
async fn test_non_positive_limit_is_unbounded() {
    for limit in [0, -1] {
        let (pipeline, counting) = counting_pipeline();
        let source = FlowRecord::new(vec![b'a'; 4096]).with_filename("any.txt");

        let result = pipeline.run(&source, &ExtractionLimits::new(limit), None).await;

        assert!(result.outcome.is_success(), "limit {} should not bound", limit);
        assert_eq!(counting.calls(), 1);
    }
}

#[tokio::test]
async fn test_stream_longer_than_declared_size() {
    let engine = ExtractionEngine::new(Arc::new(DecoderRegistry::new()));
    let content = std::io::Cursor::new(vec![b'a'; 64]);

    let outcome = engine
        .extract(
            content,
            10,
            &MediaTypeDescriptor::new("text/plain", None),
            &ExtractionLimits::new(32),
            None,
        )
        .await;

    assert!(matches!(
        outcome.failure(),
        Some(FailureReason::ExceedsSizeLimit { limit: 32, .. })
    ));
}

#[tokio::test]
async fn test_text_write_limit_is_decode_error() {
    let counting = CountingExtractor::new("wordy", &["text/plain"], "this text is longer than the limit");
    let mut registry = DecoderRegistry::new();
    registry.register(counting).unwrap();
    let pipeline = ConversionPipeline::new(Arc::new(MediaTypeDetector::new()), Arc::new(registry));

    let source = FlowRecord::new("short").with_filename("s.txt");
    let result = pipeline.run(&source, &ExtractionLimits::new(8), None).await;

    match result.outcome.failure() {
        Some(FailureReason::Decode { message }) => {
            assert!(message.to_lowercase().contains("write limit"), "got {}", message)
        }
        other => panic!("expected decode failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_oversized_file_is_rejected_without_opening_it() {
    let (pipeline, counting) = counting_pipeline();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.log");
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(64 * 1024 * 1024).unwrap();

    let source = FlowRecord::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let result = pipeline.run(&source, &ExtractionLimits::new(ONE_MIB), None).await;

    assert_eq!(
        result.outcome.failure(),
        Some(&FailureReason::ExceedsSizeLimit {
            size: 64 * 1024 * 1024,
            limit: ONE_MIB as u64,
        }),
        "the size check must come from file metadata, before the content is opened"
    );
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn test_unreadable_file_within_limit_is_detection_failure() {
    let (pipeline, counting) = counting_pipeline();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vanishing.txt");
    std::fs::write(&path, "short").unwrap();

    let source = FlowRecord::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let result = pipeline.run(&source, &ExtractionLimits::new(ONE_MIB), None).await;

    assert!(
        matches!(result.outcome.failure(), Some(FailureReason::Detection { .. })),
        "got {:?}",
        result.outcome
    );
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn test_file_backed_document_within_limit_converts() {
    let (pipeline, counting) = counting_pipeline();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.txt");
    std::fs::write(&path, "small enough").unwrap();

    let source = FlowRecord::from_path(&path).unwrap();
    let result = pipeline.run(&source, &ExtractionLimits::new(ONE_MIB), None).await;

    assert!(result.artifact.is_some(), "got {:?}", result.outcome);
    assert_eq!(counting.calls(), 1);
}
