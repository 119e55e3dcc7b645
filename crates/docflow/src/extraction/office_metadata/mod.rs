//! Office document properties.
//!
//! OOXML packages keep Dublin Core properties in `docProps/core.xml` and
//! application statistics in `docProps/app.xml`; OpenDocument packages keep
//! both in `meta.xml`. Each reader returns a plain struct that knows how to
//! fold itself into a [`PropertyBag`](crate::types::PropertyBag).

pub mod app_properties;
pub mod core_properties;
pub mod odt_properties;

pub use app_properties::{AppProperties, extract_app_properties};
pub use core_properties::{CoreProperties, extract_core_properties};
pub use odt_properties::{OdtProperties, extract_odt_properties};

use crate::{DocflowError, Result};
use roxmltree::Node;
use std::io::{Read, Seek};
use zip::ZipArchive;

pub(crate) fn parse_xml_text(node: Node, name: &str) -> Option<String> {
    node.descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub(crate) fn parse_xml_int(node: Node, name: &str) -> Option<i64> {
    node.descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .and_then(|s| s.trim().parse::<i64>().ok())
}

/// Read an optional archive member as UTF-8. A missing member is `Ok(None)`.
pub(crate) fn read_optional_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| DocflowError::parsing(format!("Failed to read {}: {}", name, e)))?;
    Ok(Some(content))
}
