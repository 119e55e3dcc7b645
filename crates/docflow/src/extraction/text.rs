//! Charset detection and decoding for plain-text inputs.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Text decoded from raw bytes, with the charset that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Decode `bytes` to text.
///
/// A byte-order mark wins, then an explicit `declared` label, then strict
/// UTF-8, then a statistical guess. Malformed sequences become U+FFFD.
pub fn decode_text(bytes: &[u8], declared: Option<&str>) -> DecodedText {
    if bytes.is_empty() {
        return DecodedText {
            text: String::new(),
            encoding: UTF_8.name(),
        };
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            text: decoded.into_owned(),
            encoding: encoding.name(),
        };
    }

    if let Some(label) = declared
        && let Some(encoding) = Encoding::for_label(label.trim().as_bytes())
    {
        let (decoded, _, _) = encoding.decode(bytes);
        return DecodedText {
            text: decoded.into_owned(),
            encoding: encoding.name(),
        };
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: text.to_string(),
            encoding: UTF_8.name(),
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Decoded text with replacement characters");
    }

    DecodedText {
        text: decoded.into_owned(),
        encoding: encoding.name(),
    }
}

/// Line, word and character counts of decoded text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub characters: usize,
}

pub fn text_stats(text: &str) -> TextStats {
    let mut stats = TextStats {
        characters: text.chars().count(),
        ..TextStats::default()
    };

    for line in text.lines() {
        stats.lines += 1;
        stats.words += line.split_whitespace().count();
    }

    stats
}
