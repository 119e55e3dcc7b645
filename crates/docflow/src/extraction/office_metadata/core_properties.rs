//! Dublin Core properties from `docProps/core.xml`.

use super::{parse_xml_text, read_optional_entry};
use crate::Result;
use crate::types::{PropertyBag, keys};
use std::io::{Read, Seek};
use zip::ZipArchive;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

impl CoreProperties {
    pub fn into_properties(self, bag: &mut PropertyBag) {
        bag.set_opt(keys::TITLE, self.title);
        bag.set_opt(keys::SUBJECT, self.subject);
        bag.set_opt(keys::CREATOR, self.creator);
        bag.set_opt(keys::KEYWORDS, self.keywords);
        bag.set_opt(keys::DESCRIPTION, self.description);
        bag.set_opt(keys::LAST_AUTHOR, self.last_modified_by);
        bag.set_opt("cp:revision", self.revision);
        bag.set_opt(keys::CREATED, self.created);
        bag.set_opt(keys::MODIFIED, self.modified);
        bag.set_opt("cp:category", self.category);
        bag.set_opt(keys::LANGUAGE, self.language);
    }
}

/// Read core properties. A package without `core.xml` yields defaults.
pub fn extract_core_properties<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<CoreProperties> {
    let Some(xml_content) = read_optional_entry(archive, "docProps/core.xml")? else {
        return Ok(CoreProperties::default());
    };

    let doc = roxmltree::Document::parse(&xml_content)?;
    let root = doc.root_element();

    Ok(CoreProperties {
        title: parse_xml_text(root, "title"),
        subject: parse_xml_text(root, "subject"),
        creator: parse_xml_text(root, "creator"),
        keywords: parse_xml_text(root, "keywords"),
        description: parse_xml_text(root, "description"),
        last_modified_by: parse_xml_text(root, "lastModifiedBy"),
        revision: parse_xml_text(root, "revision"),
        created: parse_xml_text(root, "created"),
        modified: parse_xml_text(root, "modified"),
        category: parse_xml_text(root, "category"),
        language: parse_xml_text(root, "language"),
    })
}
