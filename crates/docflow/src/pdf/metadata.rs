use super::error::Result;
use super::text::LoadedPdf;
use crate::types::{PropertyBag, keys};
use lopdf::{Dictionary, Document, Object};

/// Properties read from the trailer `/Info` dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub pdf_version: String,
    pub page_count: usize,
    pub encrypted: bool,
}

impl PdfMetadata {
    pub fn into_properties(self, bag: &mut PropertyBag) {
        bag.set_opt(keys::TITLE, self.title);
        bag.set_opt(keys::CREATOR, self.author);
        bag.set_opt(keys::SUBJECT, self.subject);
        bag.set_opt(keys::KEYWORDS, self.keywords);
        bag.set_opt(keys::CREATOR_TOOL, self.creator);
        bag.set_opt(keys::PDF_PRODUCER, self.producer);
        bag.set_opt(keys::CREATED, self.created);
        bag.set_opt(keys::MODIFIED, self.modified);
        bag.set(keys::PDF_VERSION, self.pdf_version);
        bag.set(keys::PAGE_COUNT, self.page_count.to_string());
        bag.set(keys::PDF_ENCRYPTED, self.encrypted.to_string());
    }
}

pub fn extract_metadata(loaded: &LoadedPdf) -> Result<PdfMetadata> {
    let document = &loaded.document;
    let mut metadata = PdfMetadata {
        pdf_version: document.version.clone(),
        page_count: document.get_pages().len(),
        encrypted: loaded.was_encrypted,
        ..PdfMetadata::default()
    };

    let Some(info) = info_dictionary(document) else {
        return Ok(metadata);
    };

    metadata.title = info_string(info, b"Title");
    metadata.author = info_string(info, b"Author");
    metadata.subject = info_string(info, b"Subject");
    metadata.keywords = info_string(info, b"Keywords");
    metadata.creator = info_string(info, b"Creator");
    metadata.producer = info_string(info, b"Producer");
    metadata.created = info_string(info, b"CreationDate").map(|d| normalize_pdf_date(&d));
    metadata.modified = info_string(info, b"ModDate").map(|d| normalize_pdf_date(&d));

    Ok(metadata)
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    match info.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
    .map(|s| s.trim_matches(char::from(0)).trim().to_string())
    .filter(|s| !s.is_empty())
}

/// Text strings are UTF-16BE behind a BOM, else PDFDocEncoding, which
/// agrees with Latin-1 for printable characters.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// `D:YYYYMMDDHHmmSSOHH'mm'` to ISO 8601. Unparseable values pass through.
fn normalize_pdf_date(raw: &str) -> String {
    let value = raw.strip_prefix("D:").unwrap_or(raw);
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return raw.to_string();
    }

    let field = |start: usize, default: &'static str| digits.get(start..start + 2).unwrap_or(default).to_string();
    let mut iso = format!(
        "{}-{}-{}T{}:{}:{}",
        &digits[..4],
        field(4, "01"),
        field(6, "01"),
        field(8, "00"),
        field(10, "00"),
        field(12, "00")
    );

    let zone: String = value[digits.len()..].chars().filter(|c| *c != '\'').collect();
    match zone.chars().next() {
        Some('Z') => iso.push('Z'),
        Some(sign @ ('+' | '-')) if zone.len() >= 3 => {
            let hours = &zone[1..3];
            let minutes = zone.get(3..5).unwrap_or("00");
            iso.push_str(&format!("{}{}:{}", sign, hours, minutes));
        }
        _ => {}
    }

    iso
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::sample_pdf;
    use crate::pdf::text::load_document;

    #[test]
    fn test_extract_info_dictionary() {
        let bytes = sample_pdf("body", Some("Annual Report"));
        let loaded = load_document(&bytes, None).unwrap();
        let metadata = extract_metadata(&loaded).unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Annual Report"));
        assert_eq!(metadata.author.as_deref(), Some("Test Author"));
        assert_eq!(metadata.producer.as_deref(), Some("docflow tests"));
        assert_eq!(metadata.created.as_deref(), Some("2024-01-15T10:30:00Z"));
        assert_eq!(metadata.pdf_version, "1.5");
        assert_eq!(metadata.page_count, 1);
        assert!(!metadata.encrypted);
    }

    #[test]
    fn test_no_info_dictionary() {
        let bytes = sample_pdf("body", None);
        let loaded = load_document(&bytes, None).unwrap();
        let mut bag = PropertyBag::new();
        extract_metadata(&loaded).unwrap().into_properties(&mut bag);

        assert_eq!(bag.get(keys::TITLE), None);
        assert_eq!(bag.get(keys::PAGE_COUNT), Some("1"));
        assert_eq!(bag.get(keys::PDF_ENCRYPTED), Some("false"));
    }

    #[test]
    fn test_decode_utf16_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9];
        assert_eq!(decode_pdf_string(&bytes), "Hé");
        assert_eq!(decode_pdf_string(b"caf\xE9"), "café");
    }

    #[test]
    fn test_normalize_pdf_date() {
        assert_eq!(normalize_pdf_date("D:20231231235959+02'00'"), "2023-12-31T23:59:59+02:00");
        assert_eq!(normalize_pdf_date("D:2023"), "2023-01-01T00:00:00");
        assert_eq!(normalize_pdf_date("yesterday"), "yesterday");
    }
}
