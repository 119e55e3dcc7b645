//! Metadata pipeline integration tests.

mod helpers;

use docflow::{
    DecoderRegistry, ExtractionLimits, FlowRecord, MediaTypeDetector, MetadataPipeline, PipelineConfig,
    RecordingRouter, Relationship, attributes, keys, route_metadata,
};
use helpers::*;
use std::sync::Arc;

fn pipeline() -> MetadataPipeline {
    MetadataPipeline::from_config(&PipelineConfig::default()).expect("default pipeline")
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_pdf_properties_become_attributes() {
    let source = FlowRecord::new(build_pdf("body text", Some("Annual Plan"))).with_filename("plan.pdf");
    let result = pipeline().run(&source, None).await;

    let companion = result.companion.expect("metadata should succeed");
    assert_eq!(companion.attribute(keys::TITLE), Some("Annual Plan"));
    assert_eq!(companion.attribute(keys::CREATOR), Some("Integration Author"));
    assert_eq!(companion.attribute(keys::PAGE_COUNT), Some("1"));
    assert_eq!(companion.attribute(keys::CONTENT_TYPE), Some("application/pdf"));
    assert_eq!(companion.attribute(keys::RESOURCE_NAME), Some("plan.pdf"));
    assert_eq!(companion.attribute(attributes::MIME_TYPE), Some("application/pdf"));
    assert_eq!(companion.attribute(attributes::MIME_EXTENSION), Some(".pdf"));

    assert_eq!(companion.filename(), Some("plan.pdf"));
    assert_eq!(companion.content(), source.content());
    assert_eq!(companion.parent_id(), Some(source.id()));
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_odt_properties_become_attributes() {
    let source = FlowRecord::new(build_odt(&["text"], Some("Minutes"))).with_filename("minutes.odt");
    let result = pipeline().run(&source, None).await;

    let companion = result.companion.expect("metadata should succeed");
    assert_eq!(companion.attribute(keys::TITLE), Some("Minutes"));
    assert_eq!(companion.attribute(keys::CREATOR), Some("Integration Author"));
}

#[tokio::test]
async fn test_empty_properties_are_dropped() {
    let rtf = br"{\rtf1{\info{\title }{\author Jo}}Body}";
    let source = FlowRecord::new(rtf.to_vec()).with_filename("memo.rtf");
    let result = pipeline().run(&source, None).await;

    let companion = result.companion.unwrap();
    assert_eq!(companion.attribute(keys::CREATOR), Some("Jo"));
    assert!(companion.attribute(keys::TITLE).is_none());
    assert!(companion.attributes().iter().all(|(_, value)| !value.is_empty()));
}

#[tokio::test]
async fn test_unknown_type_still_yields_companion() {
    let source = FlowRecord::new(vec![0u8, 0, 1, 2, 3]).with_filename("blob.bin");
    let result = pipeline().run(&source, None).await;

    let companion = result.companion.expect("fallback decoder still reports properties");
    assert_eq!(companion.attribute(keys::CONTENT_TYPE), Some("application/octet-stream"));
    assert_eq!(companion.attribute(keys::PARSED_BY), Some("fallback-extractor"));
    assert!(companion.attribute(attributes::MIME_EXTENSION).is_none());
}

#[tokio::test]
async fn test_routes_companion_to_success() {
    let source = FlowRecord::new("some text").with_filename("a.txt");
    let result = pipeline().run(&source, None).await;

    let mut router = RecordingRouter::new();
    assert_eq!(route_metadata(&mut router, &source, result).unwrap(), Relationship::Success);

    let transfers = router.into_transfers();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].0, Relationship::Original);
    assert_eq!(transfers[1].0, Relationship::Success);
    assert_eq!(transfers[1].1.attribute(keys::LINE_COUNT), Some("1"));
}

#[tokio::test]
async fn test_bound_applies_by_default_and_can_be_lifted() {
    let counting = CountingExtractor::new("counting", &["text/plain"], "x");
    let mut registry = DecoderRegistry::new();
    registry.register(counting.clone()).unwrap();
    let registry = Arc::new(registry);
    let detector = Arc::new(MediaTypeDetector::new());

    let source = FlowRecord::new("0123456789abcdef").with_filename("big.txt");

    let bounded = MetadataPipeline::new(Arc::clone(&detector), Arc::clone(&registry), ExtractionLimits::new(8));
    let result = bounded.run(&source, None).await;
    assert!(!result.outcome.is_success());
    assert_eq!(counting.calls(), 0);

    let unbounded = MetadataPipeline::new(detector, registry, ExtractionLimits::unbounded());
    let result = unbounded.run(&source, None).await;
    assert!(result.outcome.is_success());
    assert_eq!(counting.calls(), 1);
}

#[test]
fn test_config_can_disable_metadata_bound() {
    let config = PipelineConfig {
        bound_metadata_extraction: false,
        ..PipelineConfig::default()
    };
    let pipeline = MetadataPipeline::from_config(&config).unwrap();
    assert!(!pipeline.limits().is_bounded());
}

#[tokio::test]
async fn test_metadata_batch() {
    let docs: Vec<FlowRecord> = (0..5)
        .map(|i| FlowRecord::new(format!("line {}\n", i)).with_filename(format!("{}.txt", i)))
        .collect();

    let results = pipeline().with_max_concurrency(2).run_batch(docs).await.unwrap();
    assert_eq!(results.len(), 5);
    for (source, result) in &results {
        let companion = result.companion.as_ref().unwrap();
        assert_eq!(companion.parent_id(), Some(source.id()));
    }
}
