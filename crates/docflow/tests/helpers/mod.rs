//! Shared fixtures and assertions for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docflow::plugins::{DecodeContext, DocumentExtractor, Plugin};
use docflow::{ExtractionResult, FlowRecord, PropertyBag};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn get_test_documents_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_documents")
}

pub fn get_test_file_path(relative: &str) -> PathBuf {
    get_test_documents_dir().join(relative)
}

/// True (and a note on stderr) when a fixture is absent.
pub fn skip_if_missing(relative: &str) -> bool {
    let path = get_test_file_path(relative);
    if !path.exists() {
        eprintln!("Skipping test: missing fixture {}", path.display());
        return true;
    }
    false
}

pub fn text_of(record: &FlowRecord) -> String {
    String::from_utf8_lossy(&record.read_content().expect("readable content")).into_owned()
}

/// A single-page PDF showing `text` in Helvetica.
pub fn build_pdf(text: &str, title: Option<&str>) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    if !text.is_empty() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new("Td", vec![72.into(), 720.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal("Integration Author"),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn write_zip(entries: &[(&str, &str)], stored_first: bool) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (index, (name, body)) in entries.iter().enumerate() {
        let options = if stored_first && index == 0 {
            zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
        } else {
            zip::write::SimpleFileOptions::default()
        };
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A DOCX with one paragraph per entry and an optional `dc:title`.
pub fn build_docx(paragraphs: &[&str], title: Option<&str>) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let core = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/"><dc:title>{}</dc:title><dc:creator>Integration Author</dc:creator></cp:coreProperties>"#,
        title.unwrap_or_default()
    );

    let mut entries = vec![
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        ),
        ("word/document.xml", document.as_str()),
    ];
    if title.is_some() {
        entries.push(("docProps/core.xml", core.as_str()));
    }
    write_zip(&entries, false)
}

/// An ODT whose body holds one paragraph per entry.
pub fn build_odt(paragraphs: &[&str], title: Option<&str>) -> Vec<u8> {
    let body: String = paragraphs.iter().map(|p| format!("<text:p>{}</text:p>", p)).collect();
    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:text>{}</office:text></office:body></office:document-content>"#,
        body
    );
    let meta = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><office:meta><dc:title>{}</dc:title><meta:initial-creator>Integration Author</meta:initial-creator></office:meta></office:document-meta>"#,
        title.unwrap_or_default()
    );

    let mut entries = vec![
        ("mimetype", "application/vnd.oasis.opendocument.text"),
        ("content.xml", content.as_str()),
    ];
    if title.is_some() {
        entries.push(("meta.xml", meta.as_str()));
    }
    write_zip(&entries, true)
}

/// Decoder that counts its invocations and returns fixed text.
pub struct CountingExtractor {
    pub name: &'static str,
    pub mime_types: &'static [&'static str],
    pub text: &'static str,
    pub calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn new(name: &'static str, mime_types: &'static [&'static str], text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            mime_types,
            text,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Plugin for CountingExtractor {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn initialize(&self) -> docflow::Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> docflow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl DocumentExtractor for CountingExtractor {
    async fn extract_bytes(
        &self,
        _content: &[u8],
        mime_type: &str,
        _context: &DecodeContext,
    ) -> docflow::Result<ExtractionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExtractionResult::new(self.text, mime_type, PropertyBag::new()))
    }

    fn supported_mime_types(&self) -> &[&str] {
        self.mime_types
    }

    fn priority(&self) -> i32 {
        100
    }
}
