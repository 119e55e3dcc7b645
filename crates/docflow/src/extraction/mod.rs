//! Format-level helpers shared by the built-in decoders.

pub mod text;

#[cfg(feature = "xml")]
pub mod markup;

#[cfg(feature = "office")]
pub mod libreoffice;

#[cfg(feature = "office")]
pub mod office_metadata;

pub use text::{DecodedText, TextStats, decode_text, text_stats};
