//! Application statistics from `docProps/app.xml`.

use super::{parse_xml_int, parse_xml_text, read_optional_entry};
use crate::Result;
use crate::types::{PropertyBag, keys};
use std::io::{Read, Seek};
use zip::ZipArchive;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppProperties {
    pub application: Option<String>,
    pub company: Option<String>,
    pub pages: Option<i64>,
    pub words: Option<i64>,
    pub characters: Option<i64>,
    pub lines: Option<i64>,
    pub paragraphs: Option<i64>,
}

impl AppProperties {
    pub fn into_properties(self, bag: &mut PropertyBag) {
        bag.set_opt(keys::APPLICATION, self.application);
        bag.set_opt(keys::COMPANY, self.company);
        bag.set_opt(keys::PAGE_COUNT, self.pages.map(|n| n.to_string()));
        bag.set_opt(keys::WORD_COUNT, self.words.map(|n| n.to_string()));
        bag.set_opt(keys::CHARACTER_COUNT, self.characters.map(|n| n.to_string()));
        bag.set_opt(keys::LINE_COUNT, self.lines.map(|n| n.to_string()));
        bag.set_opt(keys::PARAGRAPH_COUNT, self.paragraphs.map(|n| n.to_string()));
    }
}

pub fn extract_app_properties<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<AppProperties> {
    let Some(xml_content) = read_optional_entry(archive, "docProps/app.xml")? else {
        return Ok(AppProperties::default());
    };

    let doc = roxmltree::Document::parse(&xml_content)?;
    let root = doc.root_element();

    Ok(AppProperties {
        application: parse_xml_text(root, "Application"),
        company: parse_xml_text(root, "Company"),
        pages: parse_xml_int(root, "Pages"),
        words: parse_xml_int(root, "Words"),
        characters: parse_xml_int(root, "Characters"),
        lines: parse_xml_int(root, "Lines"),
        paragraphs: parse_xml_int(root, "Paragraphs"),
    })
}
