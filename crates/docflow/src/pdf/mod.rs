//! PDF decoding on top of `lopdf`.
//!
//! Loading handles the standard security handler: an encrypted file needs
//! a password, and the wrong one is reported as such rather than as a
//! generic parse failure.

pub(crate) mod encryption;
pub mod error;
pub mod metadata;
pub mod text;

pub use error::PdfError;
pub use metadata::{PdfMetadata, extract_metadata};
pub use text::{LoadedPdf, extract_text, load_document};
