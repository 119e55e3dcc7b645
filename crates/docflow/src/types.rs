use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

/// Well-known property keys reported by the built-in decoders.
///
/// Names follow Dublin Core / XMP conventions so that downstream consumers
/// can treat properties uniformly across formats.
pub mod keys {
    pub const RESOURCE_NAME: &str = "resourceName";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_ENCODING: &str = "Content-Encoding";
    pub const PARSED_BY: &str = "X-Parsed-By";

    pub const TITLE: &str = "dc:title";
    pub const CREATOR: &str = "dc:creator";
    pub const SUBJECT: &str = "dc:subject";
    pub const DESCRIPTION: &str = "dc:description";
    pub const LANGUAGE: &str = "dc:language";
    pub const KEYWORDS: &str = "meta:keyword";
    pub const CREATED: &str = "dcterms:created";
    pub const MODIFIED: &str = "dcterms:modified";
    pub const LAST_AUTHOR: &str = "meta:last-author";
    pub const CREATOR_TOOL: &str = "xmp:CreatorTool";

    pub const PAGE_COUNT: &str = "xmpTPg:NPages";
    pub const WORD_COUNT: &str = "meta:word-count";
    pub const CHARACTER_COUNT: &str = "meta:character-count";
    pub const LINE_COUNT: &str = "meta:line-count";
    pub const PARAGRAPH_COUNT: &str = "meta:paragraph-count";

    pub const PDF_VERSION: &str = "pdf:PDFVersion";
    pub const PDF_PRODUCER: &str = "pdf:producer";
    pub const PDF_ENCRYPTED: &str = "pdf:encrypted";

    pub const APPLICATION: &str = "extended-properties:Application";
    pub const COMPANY: &str = "extended-properties:Company";
}

/// Structured properties reported by a decoder, before normalization.
///
/// Values may be missing or empty; [`AttributeMap::from_properties`] drops
/// those. Insertion order is kept for stable diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBag {
    entries: IndexMap<String, Option<String>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Set a property whose value the decoder may not have found.
    pub fn set_opt<V: Into<String>>(&mut self, key: impl Into<String>, value: Option<V>) {
        self.entries.insert(key.into(), value.map(Into::into));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|value| value.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn extend(&mut self, other: PropertyBag) {
        self.entries.extend(other.entries);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (key, value) in iter {
            bag.set(key, value);
        }
        bag
    }
}

/// Flat key/value attributes attached to a record.
///
/// Never holds an empty value: [`AttributeMap::insert`] silently ignores
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMap {
    inner: HashMap<String, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every non-empty property from `properties`.
    pub fn from_properties(properties: &PropertyBag) -> Self {
        let mut map = AttributeMap::new();
        for (key, value) in properties.iter() {
            if let Some(value) = value {
                map.insert(key, value);
            }
        }
        map
    }

    /// Insert `value` under `key`. Returns `false` when the value was empty
    /// and therefore dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() {
            return false;
        }
        self.inner.insert(key.into(), value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.inner.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.inner.iter()
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge(&mut self, other: &AttributeMap) {
        for (key, value) in other.iter() {
            self.inner.insert(key.clone(), value.clone());
        }
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Detected media type of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTypeDescriptor {
    /// Canonical media type, e.g. `application/pdf`. Never empty.
    pub type_identifier: String,
    /// Conventional extension including the leading dot, e.g. `.pdf`.
    pub file_extension: Option<String>,
}

impl MediaTypeDescriptor {
    pub fn new(type_identifier: impl Into<String>, file_extension: Option<String>) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            file_extension,
        }
    }
}

/// Raw output of a single decoder run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub content: String,
    pub mime_type: String,
    pub properties: PropertyBag,
}

impl ExtractionResult {
    pub fn new(content: impl Into<String>, mime_type: impl Into<String>, properties: PropertyBag) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
            properties,
        }
    }
}
