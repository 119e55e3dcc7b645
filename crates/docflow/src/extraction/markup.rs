//! Text of HTML and XML documents.
//!
//! Markup is read with `quick-xml` as a stream of events. XML keeps every
//! text node, joined by single spaces. HTML is read leniently: script and
//! style bodies are dropped, `<head>` contributes only its title and `<meta>`
//! properties, and block-level elements break lines.

use crate::types::{PropertyBag, keys};
use crate::{DocflowError, Result};
use quick_xml::Reader;
use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity};
use quick_xml::events::{BytesStart, BytesText, Event};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    Html,
    Xml,
}

/// Text and document properties read from markup.
#[derive(Debug, Clone, Default)]
pub struct MarkupText {
    pub text: String,
    pub properties: PropertyBag,
}

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "template"];

const BLOCK_ELEMENTS: [&str; 27] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "nav", "ol", "p", "pre", "section", "tr",
];

pub fn markup_text(source: &str, kind: MarkupKind) -> Result<MarkupText> {
    match kind {
        MarkupKind::Html => Ok(html_text(source)),
        MarkupKind::Xml => xml_text(source),
    }
}

fn xml_text(source: &str) -> Result<MarkupText> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut content = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let text = unescaped(&e, resolve_predefined_entity);
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    content.push_str(trimmed);
                    content.push(' ');
                }
            }
            Ok(Event::CData(e)) => {
                content.push_str(&String::from_utf8_lossy(&e));
                content.push(' ');
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocflowError::parsing(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(MarkupText {
        text: content.trim_end().to_string(),
        properties: PropertyBag::new(),
    })
}

#[derive(Default)]
struct HtmlState {
    lines: Vec<String>,
    line: String,
    title: String,
    skipping: Option<String>,
    in_head: bool,
    in_title: bool,
    properties: PropertyBag,
}

impl HtmlState {
    fn break_line(&mut self) {
        let collapsed = self.line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            self.lines.push(collapsed);
        }
        self.line.clear();
    }

    fn start(&mut self, element: &BytesStart<'_>, empty: bool) {
        let name = element_name(element.local_name().as_ref());
        if self.skipping.is_some() {
            return;
        }

        match name.as_str() {
            "html" => self.read_language(element),
            "head" => self.in_head = !empty,
            "body" => self.in_head = false,
            "title" => self.in_title = !empty,
            "meta" => self.read_meta(element),
            _ if SKIPPED_ELEMENTS.contains(&name.as_str()) => {
                if !empty {
                    self.skipping = Some(name);
                }
            }
            _ if BLOCK_ELEMENTS.contains(&name.as_str()) => self.break_line(),
            _ => {}
        }
    }

    fn end(&mut self, local_name: &[u8]) {
        let name = element_name(local_name);
        if let Some(skipped) = &self.skipping {
            if *skipped == name {
                self.skipping = None;
            }
            return;
        }

        match name.as_str() {
            "head" => self.in_head = false,
            "title" => self.in_title = false,
            _ if BLOCK_ELEMENTS.contains(&name.as_str()) => self.break_line(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.skipping.is_some() {
            return;
        }
        if self.in_title {
            self.title.push_str(text);
        } else if !self.in_head {
            self.line.push_str(text);
        }
    }

    fn read_language(&mut self, element: &BytesStart<'_>) {
        if let Some(lang) = attribute(element, b"lang") {
            self.properties.set(keys::LANGUAGE, lang);
        }
    }

    fn read_meta(&mut self, element: &BytesStart<'_>) {
        let Some(name) = attribute(element, b"name") else {
            return;
        };
        let key = match name.to_ascii_lowercase().as_str() {
            "author" => keys::CREATOR,
            "description" => keys::DESCRIPTION,
            "keywords" => keys::KEYWORDS,
            _ => return,
        };
        if let Some(content) = attribute(element, b"content").filter(|c| !c.trim().is_empty()) {
            self.properties.set(key, content.trim());
        }
    }

    fn finish(mut self) -> MarkupText {
        self.break_line();
        let title = self.title.split_whitespace().collect::<Vec<_>>().join(" ");
        if !title.is_empty() {
            self.properties.set(keys::TITLE, title);
        }
        MarkupText {
            text: self.lines.join("\n"),
            properties: self.properties,
        }
    }
}

/// Malformed HTML ends the read early; the text collected so far is kept.
fn html_text(source: &str) -> MarkupText {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut state = HtmlState::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => state.start(&e, false),
            Ok(Event::Empty(e)) => state.start(&e, true),
            Ok(Event::End(e)) => state.end(e.local_name().as_ref()),
            Ok(Event::Text(e)) => state.text(&unescaped(&e, resolve_html5_entity)),
            Ok(Event::CData(e)) => state.text(&String::from_utf8_lossy(&e)),
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(position = reader.buffer_position(), error = %e, "Stopped reading malformed HTML");
                break;
            }
            _ => {}
        }
    }

    state.finish()
}

fn unescaped<'a>(text: &BytesText<'a>, resolve: impl FnMut(&str) -> Option<&'static str>) -> Cow<'a, str> {
    text.unescape_with(resolve)
        .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(text).into_owned()))
}

fn element_name(local_name: &[u8]) -> String {
    String::from_utf8_lossy(local_name).to_ascii_lowercase()
}

fn attribute(element: &BytesStart<'_>, wanted: &[u8]) -> Option<String> {
    element
        .html_attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref().eq_ignore_ascii_case(wanted))
        .map(|attr| {
            attr.unescape_value_with(resolve_html5_entity)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}
