//! RTF decoder.
//!
//! A single pass over the control-word stream. Groups carry their
//! destination, so font tables, pictures and other ignorable destinations
//! drop out, and the `\info` group is read into document properties.

use crate::core::mime::{RTF_MIME_TYPE, RTF_TEXT_MIME_TYPE};
use crate::plugins::{DecodeContext, DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, PropertyBag, keys};
use crate::{DocflowError, Result};
use async_trait::async_trait;
use encoding_rs::{Encoding, WINDOWS_1252};
use std::collections::HashMap;

pub struct RtfExtractor;

impl RtfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RtfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for RtfExtractor {
    fn name(&self) -> &str {
        "rtf-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Extracts text and document information from RTF files"
    }

    fn author(&self) -> &str {
        "docflow contributors"
    }
}

#[async_trait]
impl DocumentExtractor for RtfExtractor {
    async fn extract_bytes(&self, content: &[u8], mime_type: &str, _context: &DecodeContext) -> Result<ExtractionResult> {
        let document = parse_rtf(content)?;
        Ok(ExtractionResult::new(document.text, mime_type, document.properties))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &[RTF_MIME_TYPE, RTF_TEXT_MIME_TYPE]
    }
}

/// Text and `\info` properties of an RTF document.
#[derive(Debug, Clone, Default)]
pub struct RtfDocument {
    pub text: String,
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Body,
    Skip,
    Info,
    Property(&'static str),
    Date(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct Group {
    dest: Destination,
    in_info: bool,
    unicode_skip: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct DateParts {
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
    hour: Option<i32>,
    minute: Option<i32>,
}

impl DateParts {
    fn to_iso(self) -> Option<String> {
        let year = self.year?;
        Some(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:00",
            year,
            self.month.unwrap_or(1).max(1),
            self.day.unwrap_or(1).max(1),
            self.hour.unwrap_or(0).max(0),
            self.minute.unwrap_or(0).max(0)
        ))
    }
}

const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "listtable",
    "listoverridetable",
    "revtbl",
    "rsidtbl",
    "pict",
    "object",
    "fldinst",
    "header",
    "headerl",
    "headerr",
    "headerf",
    "footer",
    "footerl",
    "footerr",
    "footerf",
    "footnote",
    "themedata",
    "colorschememapping",
    "datastore",
    "latentstyles",
];

fn info_property(word: &str) -> Option<Destination> {
    let key = match word {
        "title" => keys::TITLE,
        "subject" => keys::SUBJECT,
        "author" => keys::CREATOR,
        "operator" => keys::LAST_AUTHOR,
        "keywords" => keys::KEYWORDS,
        "doccomm" => keys::DESCRIPTION,
        "company" => keys::COMPANY,
        "creatim" => return Some(Destination::Date(keys::CREATED)),
        "revtim" => return Some(Destination::Date(keys::MODIFIED)),
        _ => return None,
    };
    Some(Destination::Property(key))
}

fn codepage_encoding(codepage: i32) -> Option<&'static Encoding> {
    let label = match codepage {
        65001 => "utf-8".to_string(),
        932 => "shift_jis".to_string(),
        936 => "gbk".to_string(),
        949 => "euc-kr".to_string(),
        950 => "big5".to_string(),
        10000 => "macintosh".to_string(),
        874 | 1250..=1258 => format!("windows-{}", codepage),
        _ => return None,
    };
    Encoding::for_label(label.as_bytes())
}

struct RtfParser<'a> {
    input: &'a [u8],
    pos: usize,
    stack: Vec<Group>,
    encoding: &'static Encoding,
    pending: Vec<u8>,
    pending_dest: Destination,
    body: String,
    info: HashMap<&'static str, String>,
    dates: HashMap<&'static str, DateParts>,
    statistics: Vec<(&'static str, i32)>,
}

impl<'a> RtfParser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            encoding: WINDOWS_1252,
            pending: Vec::new(),
            pending_dest: Destination::Skip,
            body: String::new(),
            info: HashMap::new(),
            dates: HashMap::new(),
            statistics: Vec::new(),
        }
    }

    fn dest(&self) -> Destination {
        self.stack.last().map(|g| g.dest).unwrap_or(Destination::Skip)
    }

    fn set_dest(&mut self, dest: Destination) {
        self.flush();
        if let Some(group) = self.stack.last_mut() {
            group.dest = dest;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn write(&mut self, dest: Destination, text: &str) {
        match dest {
            Destination::Body => self.body.push_str(text),
            Destination::Property(key) => self.info.entry(key).or_default().push_str(text),
            _ => {}
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let bytes = std::mem::take(&mut self.pending);
        let (decoded, _) = self.encoding.decode_without_bom_handling(&bytes);
        let dest = self.pending_dest;
        self.write(dest, &decoded);
    }

    fn emit_char(&mut self, ch: char) {
        self.flush();
        let dest = self.dest();
        let mut buf = [0u8; 4];
        self.write(dest, ch.encode_utf8(&mut buf));
    }

    fn emit_byte(&mut self, byte: u8) {
        let dest = self.dest();
        if dest != self.pending_dest {
            self.flush();
            self.pending_dest = dest;
        }
        self.pending.push(byte);
    }

    fn read_control_word(&mut self) -> (String, Option<i32>) {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) && self.pos - start < 32 {
            self.pos += 1;
        }
        let word = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();

        let num_start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) && self.pos - num_start < 11 {
            self.pos += 1;
        }
        let value = std::str::from_utf8(&self.input[num_start..self.pos])
            .ok()
            .and_then(|s| s.parse::<i32>().ok());
        if value.is_none() {
            self.pos = num_start;
        }

        if self.peek() == Some(b' ') {
            self.pos += 1;
        }

        (word, value)
    }

    fn read_hex_byte(&mut self) -> Option<u8> {
        let hex = self.input.get(self.pos..self.pos + 2)?;
        let byte = u8::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?;
        self.pos += 2;
        Some(byte)
    }

    /// Skip the ANSI fallback that follows a `\uN` escape.
    fn skip_unicode_fallback(&mut self, mut count: usize) {
        while count > 0 {
            match self.peek() {
                None | Some(b'{') | Some(b'}') => return,
                Some(b'\\') => match self.input.get(self.pos + 1) {
                    Some(b'\'') => self.pos += 4,
                    Some(b) if b.is_ascii_alphabetic() => {
                        self.pos += 1;
                        self.read_control_word();
                    }
                    _ => self.pos += 2,
                },
                Some(_) => self.pos += 1,
            }
            count -= 1;
        }
    }

    fn control_symbol(&mut self, symbol: u8) {
        match symbol {
            b'\\' | b'{' | b'}' => self.emit_char(symbol as char),
            b'\'' => {
                if let Some(byte) = self.read_hex_byte() {
                    self.emit_byte(byte);
                }
            }
            b'~' => self.emit_char('\u{a0}'),
            b'_' => self.emit_char('\u{2011}'),
            b'*' => self.set_dest(Destination::Skip),
            b'\n' | b'\r' => self.emit_char('\n'),
            _ => {}
        }
    }

    fn control_word(&mut self, word: &str, value: Option<i32>) {
        let dest = self.dest();
        let in_info = self.stack.last().is_some_and(|g| g.in_info);

        if in_info && let Some(info_dest) = info_property(word) {
            self.set_dest(info_dest);
            return;
        }

        if let Destination::Date(key) = dest {
            let parts = self.dates.entry(key).or_default();
            match word {
                "yr" => parts.year = value,
                "mo" => parts.month = value,
                "dy" => parts.day = value,
                "hr" => parts.hour = value,
                "min" => parts.minute = value,
                _ => {}
            }
            return;
        }

        if dest == Destination::Info {
            let statistic = match word {
                "nofpages" => Some(keys::PAGE_COUNT),
                "nofwords" => Some(keys::WORD_COUNT),
                "nofchars" => Some(keys::CHARACTER_COUNT),
                _ => None,
            };
            if let (Some(key), Some(value)) = (statistic, value) {
                self.statistics.push((key, value));
            }
            return;
        }

        match word {
            "ansicpg" => {
                if let Some(encoding) = value.and_then(codepage_encoding) {
                    self.flush();
                    self.encoding = encoding;
                }
            }
            "mac" => {
                if let Some(encoding) = codepage_encoding(10000) {
                    self.encoding = encoding;
                }
            }
            "uc" => {
                if let Some(group) = self.stack.last_mut() {
                    group.unicode_skip = value.unwrap_or(1).max(0) as usize;
                }
            }
            "u" => {
                if let Some(value) = value {
                    let code = if value < 0 { value + 65536 } else { value };
                    if let Some(ch) = u32::try_from(code).ok().and_then(char::from_u32) {
                        self.emit_char(ch);
                    }
                    let skip = self.stack.last().map(|g| g.unicode_skip).unwrap_or(1);
                    self.skip_unicode_fallback(skip);
                }
            }
            "info" => self.set_dest(Destination::Info),
            "par" | "line" | "sect" | "page" | "row" => self.emit_char('\n'),
            "tab" | "cell" => self.emit_char('\t'),
            "emdash" => self.emit_char('\u{2014}'),
            "endash" => self.emit_char('\u{2013}'),
            "emspace" | "enspace" | "qmspace" => self.emit_char(' '),
            "bullet" => self.emit_char('\u{2022}'),
            "lquote" => self.emit_char('\u{2018}'),
            "rquote" => self.emit_char('\u{2019}'),
            "ldblquote" => self.emit_char('\u{201C}'),
            "rdblquote" => self.emit_char('\u{201D}'),
            _ if SKIPPED_DESTINATIONS.contains(&word) => self.set_dest(Destination::Skip),
            _ => {}
        }
    }

    fn run(mut self) -> RtfDocument {
        while let Some(byte) = self.peek() {
            self.pos += 1;
            match byte {
                b'{' => {
                    self.flush();
                    let group = match self.stack.last() {
                        Some(parent) => Group {
                            dest: parent.dest,
                            in_info: parent.dest == Destination::Info,
                            unicode_skip: parent.unicode_skip,
                        },
                        None => Group {
                            dest: Destination::Body,
                            in_info: false,
                            unicode_skip: 1,
                        },
                    };
                    self.stack.push(group);
                }
                b'}' => {
                    self.flush();
                    self.stack.pop();
                    if self.stack.is_empty() {
                        break;
                    }
                }
                b'\\' => match self.peek() {
                    Some(next) if next.is_ascii_alphabetic() => {
                        let (word, value) = self.read_control_word();
                        self.control_word(&word, value);
                    }
                    Some(next) => {
                        self.pos += 1;
                        self.control_symbol(next);
                    }
                    None => {}
                },
                b'\r' | b'\n' | 0 => {}
                _ if byte.is_ascii() => self.emit_char(byte as char),
                _ => self.emit_byte(byte),
            }
        }
        self.flush();

        let mut properties = PropertyBag::new();
        let mut info: Vec<_> = self.info.into_iter().collect();
        info.sort_by_key(|(key, _)| *key);
        for (key, value) in info {
            properties.set(key, value.trim());
        }
        let mut dates: Vec<_> = self.dates.into_iter().collect();
        dates.sort_by_key(|(key, _)| *key);
        for (key, parts) in dates {
            properties.set_opt(key, parts.to_iso());
        }
        for (key, value) in self.statistics {
            properties.set(key, value.to_string());
        }

        RtfDocument {
            text: self.body.trim().to_string(),
            properties,
        }
    }
}

/// Parse RTF bytes. Input that does not open with `{\rtf` is rejected.
pub fn parse_rtf(content: &[u8]) -> Result<RtfDocument> {
    let start = content
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(content.len());
    if !content[start..].starts_with(b"{\\rtf") {
        return Err(DocflowError::parsing("Not an RTF document: missing {\\rtf header"));
    }

    Ok(RtfParser::new(&content[start..]).run())
}
