//! Media type detection.
//!
//! [`MediaTypeDetector`] sniffs a bounded prefix of the content. A filename
//! hint only refines generic results (`application/octet-stream`,
//! `text/plain`, bare ZIP or OLE2 containers); when the bytes say something
//! specific, the bytes win.

use crate::core::config::DEFAULT_DETECTION_PREFIX_BYTES;
use crate::types::MediaTypeDescriptor;
use crate::Result;
use memchr::memmem;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io::{Chain, Cursor, Read};
use std::path::Path;

pub const OCTET_STREAM_MIME_TYPE: &str = "application/octet-stream";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const RTF_MIME_TYPE: &str = "application/rtf";
pub const RTF_TEXT_MIME_TYPE: &str = "text/rtf";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOCM_MIME_TYPE: &str = "application/vnd.ms-word.document.macroEnabled.12";
pub const DOTX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.template";
pub const LEGACY_WORD_MIME_TYPE: &str = "application/msword";
pub const ODT_MIME_TYPE: &str = "application/vnd.oasis.opendocument.text";
pub const OTT_MIME_TYPE: &str = "application/vnd.oasis.opendocument.text-template";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXCEL_BINARY_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const POWER_POINT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const LEGACY_POWERPOINT_MIME_TYPE: &str = "application/vnd.ms-powerpoint";
pub const OUTLOOK_MIME_TYPE: &str = "application/vnd.ms-outlook";
pub const OPENDOC_SPREADSHEET_MIME_TYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";
pub const OPENDOC_PRESENTATION_MIME_TYPE: &str = "application/vnd.oasis.opendocument.presentation";
pub const EPUB_MIME_TYPE: &str = "application/epub+zip";
pub const ZIP_MIME_TYPE: &str = "application/zip";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const XML_MIME_TYPE: &str = "application/xml";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const CSV_MIME_TYPE: &str = "text/csv";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

/// OOXML package whose main part could not be identified from the prefix.
pub const OOXML_GENERIC_MIME_TYPE: &str = "application/x-tika-ooxml";
/// OLE2 compound file whose application could not be identified.
pub const OLE_GENERIC_MIME_TYPE: &str = "application/x-tika-msoffice";

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Filename extension to media type, consulted before `mime_guess`.
static EXT_TO_MIME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("txt", PLAIN_TEXT_MIME_TYPE);
    m.insert("text", PLAIN_TEXT_MIME_TYPE);
    m.insert("log", PLAIN_TEXT_MIME_TYPE);
    m.insert("md", MARKDOWN_MIME_TYPE);
    m.insert("markdown", MARKDOWN_MIME_TYPE);
    m.insert("csv", CSV_MIME_TYPE);
    m.insert("json", JSON_MIME_TYPE);
    m.insert("xml", XML_MIME_TYPE);
    m.insert("html", HTML_MIME_TYPE);
    m.insert("htm", HTML_MIME_TYPE);

    m.insert("pdf", PDF_MIME_TYPE);
    m.insert("rtf", RTF_MIME_TYPE);

    m.insert("docx", DOCX_MIME_TYPE);
    m.insert("docm", DOCM_MIME_TYPE);
    m.insert("dotx", DOTX_MIME_TYPE);
    m.insert("doc", LEGACY_WORD_MIME_TYPE);
    m.insert("dot", LEGACY_WORD_MIME_TYPE);
    m.insert("odt", ODT_MIME_TYPE);
    m.insert("ott", OTT_MIME_TYPE);

    m.insert("xlsx", EXCEL_MIME_TYPE);
    m.insert("xls", EXCEL_BINARY_MIME_TYPE);
    m.insert("pptx", POWER_POINT_MIME_TYPE);
    m.insert("ppt", LEGACY_POWERPOINT_MIME_TYPE);
    m.insert("msg", OUTLOOK_MIME_TYPE);
    m.insert("ods", OPENDOC_SPREADSHEET_MIME_TYPE);
    m.insert("odp", OPENDOC_PRESENTATION_MIME_TYPE);
    m.insert("epub", EPUB_MIME_TYPE);
    m.insert("zip", ZIP_MIME_TYPE);

    m
});

/// Preferred extension (with leading dot) for a media type.
static MIME_TO_EXT: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(PLAIN_TEXT_MIME_TYPE, ".txt");
    m.insert(MARKDOWN_MIME_TYPE, ".md");
    m.insert(CSV_MIME_TYPE, ".csv");
    m.insert(JSON_MIME_TYPE, ".json");
    m.insert(XML_MIME_TYPE, ".xml");
    m.insert("text/xml", ".xml");
    m.insert(HTML_MIME_TYPE, ".html");

    m.insert(PDF_MIME_TYPE, ".pdf");
    m.insert(RTF_MIME_TYPE, ".rtf");
    m.insert(RTF_TEXT_MIME_TYPE, ".rtf");

    m.insert(DOCX_MIME_TYPE, ".docx");
    m.insert(DOCM_MIME_TYPE, ".docm");
    m.insert(DOTX_MIME_TYPE, ".dotx");
    m.insert(LEGACY_WORD_MIME_TYPE, ".doc");
    m.insert(ODT_MIME_TYPE, ".odt");
    m.insert(OTT_MIME_TYPE, ".ott");

    m.insert(EXCEL_MIME_TYPE, ".xlsx");
    m.insert(EXCEL_BINARY_MIME_TYPE, ".xls");
    m.insert(POWER_POINT_MIME_TYPE, ".pptx");
    m.insert(LEGACY_POWERPOINT_MIME_TYPE, ".ppt");
    m.insert(OUTLOOK_MIME_TYPE, ".msg");
    m.insert(OPENDOC_SPREADSHEET_MIME_TYPE, ".ods");
    m.insert(OPENDOC_PRESENTATION_MIME_TYPE, ".odp");
    m.insert(EPUB_MIME_TYPE, ".epub");
    m.insert(ZIP_MIME_TYPE, ".zip");

    m
});

/// Types that name a container family rather than a format. They have no
/// conventional extension.
const GENERIC_TYPES: [&str; 3] = [OCTET_STREAM_MIME_TYPE, OOXML_GENERIC_MIME_TYPE, OLE_GENERIC_MIME_TYPE];

const ZIP_BASED_TYPES: [&str; 11] = [
    DOCX_MIME_TYPE,
    DOCM_MIME_TYPE,
    DOTX_MIME_TYPE,
    EXCEL_MIME_TYPE,
    POWER_POINT_MIME_TYPE,
    ODT_MIME_TYPE,
    OTT_MIME_TYPE,
    OPENDOC_SPREADSHEET_MIME_TYPE,
    OPENDOC_PRESENTATION_MIME_TYPE,
    EPUB_MIME_TYPE,
    "application/java-archive",
];

const OLE_BASED_TYPES: [&str; 4] = [
    LEGACY_WORD_MIME_TYPE,
    EXCEL_BINARY_MIME_TYPE,
    LEGACY_POWERPOINT_MIME_TYPE,
    OUTLOOK_MIME_TYPE,
];

const TEXTUAL_APPLICATION_TYPES: [&str; 6] = [
    JSON_MIME_TYPE,
    XML_MIME_TYPE,
    "application/x-yaml",
    "application/toml",
    "application/javascript",
    "application/x-sh",
];

/// A reader that first replays the sniffed prefix and then continues with
/// the rest of the original stream.
pub type ReplayReader<R> = Chain<Cursor<Vec<u8>>, R>;

/// Content-based media type detector.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MediaTypeDetector {
    prefix_len: usize,
}

impl Default for MediaTypeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTypeDetector {
    pub fn new() -> Self {
        Self::with_prefix_len(DEFAULT_DETECTION_PREFIX_BYTES)
    }

    /// A detector that inspects at most `prefix_len` leading bytes.
    pub fn with_prefix_len(prefix_len: usize) -> Self {
        Self {
            prefix_len: prefix_len.max(1),
        }
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Detect the media type of `reader`.
    ///
    /// Reads at most [`prefix_len`](Self::prefix_len) bytes and hands back a
    /// reader positioned at the start of the content.
    ///
    /// # Errors
    ///
    /// Returns `DocflowError::Io` only when the stream can't be read.
    /// Unrecognized content is `application/octet-stream`, not an error.
    pub fn detect<R: Read>(&self, mut reader: R, hint: Option<&str>) -> Result<(MediaTypeDescriptor, ReplayReader<R>)> {
        let mut prefix = Vec::with_capacity(self.prefix_len.min(8192));
        reader.by_ref().take(self.prefix_len as u64).read_to_end(&mut prefix)?;

        let descriptor = self.detect_bytes(&prefix, hint);
        Ok((descriptor, Cursor::new(prefix).chain(reader)))
    }

    /// Detect from an in-memory prefix. Pure: the same prefix and hint always
    /// yield the same descriptor.
    pub fn detect_bytes(&self, prefix: &[u8], hint: Option<&str>) -> MediaTypeDescriptor {
        let prefix = &prefix[..prefix.len().min(self.prefix_len)];
        let sniffed = sniff(prefix);
        let type_identifier = refine_with_hint(sniffed, hint);
        let file_extension = self.extension_for(&type_identifier);
        MediaTypeDescriptor::new(type_identifier, file_extension)
    }

    /// Conventional extension (with leading dot) for `mime_type`, if known.
    pub fn extension_for(&self, mime_type: &str) -> Option<String> {
        extension_for_mime(mime_type)
    }
}

/// Conventional extension for a media type, with leading dot.
pub fn extension_for_mime(mime_type: &str) -> Option<String> {
    let essence = essence(mime_type);
    if GENERIC_TYPES.contains(&essence.as_str()) {
        return None;
    }

    if let Some(ext) = MIME_TO_EXT.get(essence.as_str()) {
        return Some((*ext).to_string());
    }

    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{}", ext))
}

/// Media type implied by a filename's extension, if any.
pub fn type_for_filename(filename: &str) -> Option<String> {
    let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    if extension.is_empty() {
        return None;
    }

    if let Some(mime) = EXT_TO_MIME.get(extension.as_str()) {
        return Some((*mime).to_string());
    }

    mime_guess::from_ext(&extension).first_raw().map(str::to_string)
}

fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase()
}

fn sniff(prefix: &[u8]) -> String {
    if prefix.is_empty() {
        return OCTET_STREAM_MIME_TYPE.to_string();
    }

    let body = prefix.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(prefix);
    if body.starts_with(b"%PDF-") {
        return PDF_MIME_TYPE.to_string();
    }
    if body.starts_with(b"{\\rtf") {
        return RTF_MIME_TYPE.to_string();
    }

    if prefix.starts_with(ZIP_LOCAL_HEADER) {
        return sniff_zip(prefix);
    }

    if prefix.starts_with(OLE_MAGIC) {
        return match infer::get(prefix) {
            Some(kind) if OLE_BASED_TYPES.contains(&kind.mime_type()) => kind.mime_type().to_string(),
            _ => OLE_GENERIC_MIME_TYPE.to_string(),
        };
    }

    if let Some(kind) = infer::get(prefix) {
        return kind.mime_type().to_string();
    }

    if looks_like_text(prefix) {
        return PLAIN_TEXT_MIME_TYPE.to_string();
    }

    OCTET_STREAM_MIME_TYPE.to_string()
}

/// One local file header found in a ZIP prefix.
struct LocalEntry<'a> {
    name: &'a [u8],
    data: &'a [u8],
}

fn read_u16(buf: &[u8], at: usize) -> Option<usize> {
    buf.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]) as usize)
}

fn read_u32(buf: &[u8], at: usize) -> Option<usize> {
    buf.get(at..at + 4).map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
}

fn local_entry_at(prefix: &[u8], offset: usize) -> Option<LocalEntry<'_>> {
    let compressed_size = read_u32(prefix, offset + 18)?;
    let name_len = read_u16(prefix, offset + 26)?;
    let extra_len = read_u16(prefix, offset + 28)?;
    let name_start = offset + 30;
    let name = prefix.get(name_start..name_start + name_len)?;

    let data_start = name_start + name_len + extra_len;
    let data_end = if compressed_size > 0 {
        (data_start + compressed_size).min(prefix.len())
    } else {
        memmem::find(prefix.get(data_start..)?, ZIP_LOCAL_HEADER)
            .map(|pos| data_start + pos)
            .unwrap_or(prefix.len())
    };
    let data = prefix.get(data_start..data_end).unwrap_or_default();

    Some(LocalEntry { name, data })
}

fn sniff_zip(prefix: &[u8]) -> String {
    if let Some(first) = local_entry_at(prefix, 0)
        && first.name == b"mimetype"
    {
        let declared = String::from_utf8_lossy(first.data).trim().to_string();
        if declared.contains('/') && !declared.contains(char::is_whitespace) {
            return declared;
        }
    }

    let mut saw_content_types = false;
    for offset in memmem::find_iter(prefix, ZIP_LOCAL_HEADER) {
        let Some(entry) = local_entry_at(prefix, offset) else {
            continue;
        };
        if entry.name.starts_with(b"word/") {
            return DOCX_MIME_TYPE.to_string();
        }
        if entry.name.starts_with(b"xl/") {
            return EXCEL_MIME_TYPE.to_string();
        }
        if entry.name.starts_with(b"ppt/") {
            return POWER_POINT_MIME_TYPE.to_string();
        }
        if entry.name == b"[Content_Types].xml" {
            saw_content_types = true;
        }
    }

    if saw_content_types {
        OOXML_GENERIC_MIME_TYPE.to_string()
    } else {
        ZIP_MIME_TYPE.to_string()
    }
}

fn looks_like_text(prefix: &[u8]) -> bool {
    if prefix.starts_with(b"\xFF\xFE") || prefix.starts_with(b"\xFE\xFF") {
        return true;
    }
    if memchr::memchr(0, prefix).is_some() {
        return false;
    }

    let utf8_ok = match std::str::from_utf8(prefix) {
        Ok(_) => true,
        // A multi-byte sequence cut off by the prefix boundary.
        Err(e) => e.error_len().is_none(),
    };
    if utf8_ok {
        return true;
    }

    let control = prefix
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0C | 0x1B))
        .count();
    control * 20 < prefix.len()
}

fn is_textual(mime_type: &str) -> bool {
    mime_type.starts_with("text/") || TEXTUAL_APPLICATION_TYPES.contains(&mime_type) || mime_type.ends_with("+xml")
}

fn refine_with_hint(sniffed: String, hint: Option<&str>) -> String {
    let Some(hinted) = hint.filter(|h| !h.is_empty()).and_then(type_for_filename) else {
        return sniffed;
    };
    if hinted == sniffed {
        return sniffed;
    }

    let accepts_hint = match sniffed.as_str() {
        OCTET_STREAM_MIME_TYPE => true,
        PLAIN_TEXT_MIME_TYPE => is_textual(&hinted),
        ZIP_MIME_TYPE => ZIP_BASED_TYPES.contains(&hinted.as_str()),
        OOXML_GENERIC_MIME_TYPE => {
            hinted.starts_with("application/vnd.openxmlformats-officedocument.")
                || (hinted.starts_with("application/vnd.ms-") && hinted.ends_with(".12"))
        }
        OLE_GENERIC_MIME_TYPE => OLE_BASED_TYPES.contains(&hinted.as_str()),
        _ => false,
    };

    if accepts_hint {
        tracing::debug!(sniffed = %sniffed, hinted = %hinted, "Refined generic media type from filename");
        hinted
    } else {
        sniffed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(bytes: &[u8], hint: Option<&str>) -> MediaTypeDescriptor {
        MediaTypeDetector::new().detect_bytes(bytes, hint)
    }

    #[cfg(feature = "office")]
    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        use std::io::Write;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_detect_pdf() {
        let descriptor = detect(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj", None);
        assert_eq!(descriptor.type_identifier, PDF_MIME_TYPE);
        assert_eq!(descriptor.file_extension.as_deref(), Some(".pdf"));
    }

    #[test]
    fn test_detect_rtf() {
        let descriptor = detect(br"{\rtf1\ansi\deff0 {\fonttbl} hello}", None);
        assert_eq!(descriptor.type_identifier, RTF_MIME_TYPE);
        assert_eq!(descriptor.file_extension.as_deref(), Some(".rtf"));
    }

    #[test]
    fn test_detect_plain_text() {
        let descriptor = detect("Grüße aus Berlin\nline two\n".as_bytes(), None);
        assert_eq!(descriptor.type_identifier, PLAIN_TEXT_MIME_TYPE);
        assert_eq!(descriptor.file_extension.as_deref(), Some(".txt"));
    }

    #[test]
    fn test_detect_latin1_text() {
        let descriptor = detect(b"caf\xE9 cr\xE8me br\xFBl\xE9e\n", None);
        assert_eq!(descriptor.type_identifier, PLAIN_TEXT_MIME_TYPE);
    }

    #[test]
    fn test_unknown_binary_is_octet_stream() {
        let descriptor = detect(&[0x00, 0x01, 0x02, 0x03, 0xFF, 0x00, 0x10], None);
        assert_eq!(descriptor.type_identifier, OCTET_STREAM_MIME_TYPE);
        assert!(descriptor.file_extension.is_none());
    }

    #[test]
    fn test_empty_content_is_octet_stream() {
        let descriptor = detect(b"", None);
        assert_eq!(descriptor.type_identifier, OCTET_STREAM_MIME_TYPE);
    }

    #[test]
    fn test_content_wins_over_hint() {
        let descriptor = detect(b"%PDF-1.4\n", Some("report.txt"));
        assert_eq!(descriptor.type_identifier, PDF_MIME_TYPE);
    }

    #[test]
    fn test_hint_refines_plain_text() {
        let descriptor = detect(b"a,b,c\n1,2,3\n", Some("table.csv"));
        assert_eq!(descriptor.type_identifier, CSV_MIME_TYPE);
        assert_eq!(descriptor.file_extension.as_deref(), Some(".csv"));
    }

    #[test]
    fn test_hint_does_not_turn_text_into_binary_format() {
        let descriptor = detect(b"just words", Some("fake.pdf"));
        assert_eq!(descriptor.type_identifier, PLAIN_TEXT_MIME_TYPE);
    }

    #[test]
    fn test_hint_used_for_unknown_binary() {
        let descriptor = detect(&[0x00, 0x9F, 0x13, 0x00], Some("legacy.doc"));
        assert_eq!(descriptor.type_identifier, LEGACY_WORD_MIME_TYPE);
        assert_eq!(descriptor.file_extension.as_deref(), Some(".doc"));
    }

    #[test]
    fn test_ole_without_identification_is_generic() {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.resize(512, 0);
        let descriptor = detect(&bytes, None);
        assert_eq!(descriptor.type_identifier, OLE_GENERIC_MIME_TYPE);
        assert!(descriptor.file_extension.is_none());

        let hinted = detect(&bytes, Some("memo.doc"));
        assert_eq!(hinted.type_identifier, LEGACY_WORD_MIME_TYPE);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let detector = MediaTypeDetector::new();
        let bytes = b"%PDF-1.5\nrest";
        let first = detector.detect_bytes(bytes, Some("a.bin"));
        let second = detector.detect_bytes(bytes, Some("a.bin"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_detect_replays_prefix() {
        let content: Vec<u8> = b"%PDF-1.4\n".iter().copied().chain(std::iter::repeat_n(b'x', 1000)).collect();
        let detector = MediaTypeDetector::with_prefix_len(16);

        let (descriptor, mut reader) = detector.detect(Cursor::new(content.clone()), None).unwrap();
        assert_eq!(descriptor.type_identifier, PDF_MIME_TYPE);

        let mut replayed = Vec::new();
        reader.read_to_end(&mut replayed).unwrap();
        assert_eq!(replayed, content);
    }

    #[test]
    fn test_detect_surfaces_io_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
        }

        let result = MediaTypeDetector::new().detect(Broken, None);
        assert!(matches!(result, Err(crate::DocflowError::Io(_))));
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(extension_for_mime(DOCX_MIME_TYPE).as_deref(), Some(".docx"));
        assert_eq!(extension_for_mime("text/plain; charset=UTF-8").as_deref(), Some(".txt"));
        assert_eq!(extension_for_mime("image/png").as_deref(), Some(".png"));
        assert!(extension_for_mime(OOXML_GENERIC_MIME_TYPE).is_none());
        assert!(extension_for_mime("application/x-made-up-thing").is_none());
    }

    #[test]
    fn test_type_for_filename() {
        assert_eq!(type_for_filename("Report.PDF").as_deref(), Some(PDF_MIME_TYPE));
        assert_eq!(type_for_filename("notes.odt").as_deref(), Some(ODT_MIME_TYPE));
        assert_eq!(type_for_filename("image.png").as_deref(), Some("image/png"));
        assert!(type_for_filename("README").is_none());
        assert!(type_for_filename("archive.").is_none());
    }

    #[cfg(feature = "office")]
    #[test]
    fn test_detect_docx_container() {
        let bytes = zip_with(&[
            ("[Content_Types].xml", b"<Types/>"),
            ("_rels/.rels", b"<Relationships/>"),
            ("word/document.xml", b"<w:document/>"),
        ]);
        let descriptor = detect(&bytes, None);
        assert_eq!(descriptor.type_identifier, DOCX_MIME_TYPE);
        assert_eq!(descriptor.file_extension.as_deref(), Some(".docx"));
    }

    #[cfg(feature = "office")]
    #[test]
    fn test_detect_odt_container() {
        let bytes = zip_with(&[
            ("mimetype", ODT_MIME_TYPE.as_bytes()),
            ("content.xml", b"<office:document-content/>"),
        ]);
        let descriptor = detect(&bytes, Some("wrong.docx"));
        assert_eq!(descriptor.type_identifier, ODT_MIME_TYPE);
        assert_eq!(descriptor.file_extension.as_deref(), Some(".odt"));
    }

    #[cfg(feature = "office")]
    #[test]
    fn test_plain_zip_refined_by_container_hint_only() {
        let bytes = zip_with(&[("data.bin", b"\x00\x01")]);
        assert_eq!(detect(&bytes, None).type_identifier, ZIP_MIME_TYPE);
        assert_eq!(detect(&bytes, Some("a.docx")).type_identifier, DOCX_MIME_TYPE);
        assert_eq!(detect(&bytes, Some("a.pdf")).type_identifier, ZIP_MIME_TYPE);
    }
}
