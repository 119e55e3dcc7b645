//! OpenDocument properties from `meta.xml`.

use super::{parse_xml_text, read_optional_entry};
use crate::Result;
use crate::types::{PropertyBag, keys};
use std::io::{Read, Seek};
use zip::ZipArchive;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdtProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub initial_creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub creation_date: Option<String>,
    pub language: Option<String>,
    pub generator: Option<String>,
    pub page_count: Option<String>,
    pub word_count: Option<String>,
    pub character_count: Option<String>,
    pub paragraph_count: Option<String>,
}

impl OdtProperties {
    pub fn into_properties(self, bag: &mut PropertyBag) {
        bag.set_opt(keys::TITLE, self.title);
        bag.set_opt(keys::SUBJECT, self.subject);
        // The initial creator is the author; dc:creator is whoever saved last.
        bag.set_opt(keys::CREATOR, self.initial_creator.or(self.creator.clone()));
        bag.set_opt(keys::LAST_AUTHOR, self.creator);
        bag.set_opt(keys::KEYWORDS, self.keywords);
        bag.set_opt(keys::DESCRIPTION, self.description);
        bag.set_opt(keys::MODIFIED, self.date);
        bag.set_opt(keys::CREATED, self.creation_date);
        bag.set_opt(keys::LANGUAGE, self.language);
        bag.set_opt(keys::CREATOR_TOOL, self.generator);
        bag.set_opt(keys::PAGE_COUNT, self.page_count);
        bag.set_opt(keys::WORD_COUNT, self.word_count);
        bag.set_opt(keys::CHARACTER_COUNT, self.character_count);
        bag.set_opt(keys::PARAGRAPH_COUNT, self.paragraph_count);
    }
}

/// Statistics live as attributes of `<meta:document-statistic>`.
fn statistic(root: roxmltree::Node, name: &str) -> Option<String> {
    root.descendants()
        .find(|n| n.has_tag_name("document-statistic"))
        .and_then(|n| {
            n.attributes()
                .find(|attr| attr.name() == name)
                .map(|attr| attr.value().trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

pub fn extract_odt_properties<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<OdtProperties> {
    let Some(xml_content) = read_optional_entry(archive, "meta.xml")? else {
        return Ok(OdtProperties::default());
    };

    let doc = roxmltree::Document::parse(&xml_content)?;
    let root = doc.root_element();

    Ok(OdtProperties {
        title: parse_xml_text(root, "title"),
        subject: parse_xml_text(root, "subject"),
        creator: parse_xml_text(root, "creator"),
        initial_creator: parse_xml_text(root, "initial-creator"),
        keywords: parse_xml_text(root, "keyword"),
        description: parse_xml_text(root, "description"),
        date: parse_xml_text(root, "date"),
        creation_date: parse_xml_text(root, "creation-date"),
        language: parse_xml_text(root, "language"),
        generator: parse_xml_text(root, "generator"),
        page_count: statistic(root, "page-count"),
        word_count: statistic(root, "word-count"),
        character_count: statistic(root, "character-count"),
        paragraph_count: statistic(root, "paragraph-count"),
    })
}
