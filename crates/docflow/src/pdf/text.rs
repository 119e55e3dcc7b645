use super::encryption::decrypt_document;
use super::error::{PdfError, Result};
use lopdf::{Document, Object};

/// A parsed PDF, decrypted if it needed to be.
#[derive(Debug)]
pub struct LoadedPdf {
    pub document: Document,
    pub was_encrypted: bool,
}

/// Parse `pdf_bytes`, decrypting with `password` when the file is encrypted.
///
/// An encrypted file without a password fails with `PasswordRequired`; a
/// password the security handler rejects fails with `InvalidPassword`. Files
/// that open with the empty user password ignore `password`.
pub fn load_document(pdf_bytes: &[u8], password: Option<&str>) -> Result<LoadedPdf> {
    let document = Document::load_mem(pdf_bytes)?;

    if document.encryption_state.is_some() {
        return Ok(LoadedPdf {
            document,
            was_encrypted: true,
        });
    }

    let Ok(encrypt_id) = document.trailer.get(b"Encrypt").and_then(Object::as_reference) else {
        return Ok(LoadedPdf {
            document,
            was_encrypted: false,
        });
    };

    let document = decrypt_document(pdf_bytes, encrypt_id, password.unwrap_or(""))?;
    Ok(LoadedPdf {
        document,
        was_encrypted: true,
    })
}

/// Text of every page, in page order.
pub fn extract_text(document: &Document) -> Result<String> {
    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Ok(String::new());
    }

    document
        .extract_text(&page_numbers)
        .map_err(|e| PdfError::TextExtractionFailed(e.to_string()))
}
