//! Standard security handler support.
//!
//! `Document::load_mem` only opens encrypted files whose user password is
//! empty. For anything else it keeps nothing but the `/Encrypt` dictionary,
//! so the file is parsed a second time with the trailer's `/Encrypt` key and
//! the `/ObjStm` type hidden behind names of the same length. Offsets in the
//! cross-reference table stay valid, every object is loaded as ciphertext,
//! and the real names are put back before `Document::decrypt` runs.

use super::error::{PdfError, Result};
use lopdf::encryption::DecryptionError;
use lopdf::{Document, Object, ObjectId};
use memchr::memmem;

const ENCRYPT_KEY: &[u8] = b"/Encrypt";
const HIDDEN_ENCRYPT_KEY: &[u8] = b"/Encryp_";
const OBJECT_STREAM_TYPE: &[u8] = b"/ObjStm";
const HIDDEN_OBJECT_STREAM_TYPE: &[u8] = b"/ObjSt_";

/// Parse and decrypt an encrypted file whose `/Encrypt` dictionary is `encrypt_id`.
///
/// An empty `password` tries the empty user password; if that is rejected
/// the error is `PasswordRequired`.
pub(crate) fn decrypt_document(pdf_bytes: &[u8], encrypt_id: ObjectId, password: &str) -> Result<Document> {
    let masked = rename_names(
        pdf_bytes,
        &[
            (ENCRYPT_KEY, HIDDEN_ENCRYPT_KEY),
            (OBJECT_STREAM_TYPE, HIDDEN_OBJECT_STREAM_TYPE),
        ],
    );

    let mut document = Document::load_mem(&masked)?;
    document.trailer.remove(&HIDDEN_ENCRYPT_KEY[1..]);
    document.trailer.set("Encrypt", Object::Reference(encrypt_id));
    restore_object_stream_types(&mut document);
    drop_legacy_key_length(&mut document, encrypt_id);

    document.decrypt(password).map_err(|e| match e {
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword) if password.is_empty() => {
            PdfError::PasswordRequired
        }
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => PdfError::InvalidPassword,
        other => {
            tracing::debug!(error = %other, "PDF decryption failed");
            PdfError::InvalidPdf(format!("Cannot decrypt document: {}", other))
        }
    })?;

    Ok(document)
}

/// `/Length` is only defined for `/V 2` and later, but revision 2 writers
/// commonly emit `/Length 40`, which lopdf rejects.
fn drop_legacy_key_length(document: &mut Document, encrypt_id: ObjectId) {
    if let Ok(dict) = document.get_dictionary_mut(encrypt_id)
        && dict.get(b"V").and_then(Object::as_i64).is_ok_and(|version| version <= 1)
        && dict.remove(b"Length").is_some()
    {
        tracing::debug!("Ignoring /Length in a /V 1 encryption dictionary");
    }
}

fn restore_object_stream_types(document: &mut Document) {
    for object in document.objects.values_mut() {
        if let Object::Stream(stream) = object
            && stream.dict.has_type(&HIDDEN_OBJECT_STREAM_TYPE[1..])
        {
            stream
                .dict
                .set("Type", Object::Name(OBJECT_STREAM_TYPE[1..].to_vec()));
        }
    }
}

/// Replace whole PDF names in place. Each replacement has the same length
/// as the name it replaces.
fn rename_names(bytes: &[u8], renames: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut renamed = bytes.to_vec();
    for (from, to) in renames {
        debug_assert_eq!(from.len(), to.len());
        for at in memmem::find_iter(bytes, from) {
            let terminated = bytes.get(at + from.len()).is_none_or(|&next| ends_name(next));
            if terminated {
                renamed[at..at + to.len()].copy_from_slice(to);
            }
        }
    }
    renamed
}

fn ends_name(byte: u8) -> bool {
    matches!(
        byte,
        b'\0' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_names_matches_whole_names_only() {
        let input = b"<< /Encrypt 6 0 R /EncryptMetadata false /Type/ObjStm>>";
        let renamed = rename_names(
            input,
            &[
                (ENCRYPT_KEY, HIDDEN_ENCRYPT_KEY),
                (OBJECT_STREAM_TYPE, HIDDEN_OBJECT_STREAM_TYPE),
            ],
        );

        assert_eq!(
            renamed.as_slice(),
            b"<< /Encryp_ 6 0 R /EncryptMetadata false /Type/ObjSt_>>".as_slice()
        );
        assert_eq!(renamed.len(), input.len());
    }

    #[test]
    fn test_rename_names_at_end_of_input() {
        let renamed = rename_names(b"/Encrypt", &[(ENCRYPT_KEY, HIDDEN_ENCRYPT_KEY)]);
        assert_eq!(renamed.as_slice(), HIDDEN_ENCRYPT_KEY);
    }
}
