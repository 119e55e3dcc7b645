//! Records exchanged with the host pipeline.
//!
//! A [`FlowRecord`] is both the incoming source document and any record the
//! pipelines derive from it. Content is immutable and shared, so deriving a
//! record never copies bytes and the original is never modified.
//!
//! Content is either held in memory or left in a file. A file-backed record
//! knows its size up front and is only read when a pipeline opens it, so an
//! oversized file is rejected without being loaded.

use crate::types::AttributeMap;
use crate::Result;
use serde::Serialize;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Well-known record attribute names.
pub mod attributes {
    pub const FILENAME: &str = "filename";
    pub const PATH: &str = "path";
    pub const UUID: &str = "uuid";
    pub const MIME_TYPE: &str = "mime.type";
    pub const MIME_EXTENSION: &str = "mime.extension";
}

/// One unit of work flowing through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct FlowRecord {
    id: Uuid,
    parent_id: Option<Uuid>,
    attributes: AttributeMap,
    #[serde(skip)]
    content: Content,
}

#[derive(Debug, Clone)]
enum Content {
    Bytes(Arc<[u8]>),
    File { path: Arc<PathBuf>, size: u64 },
}

impl Content {
    fn bytes(content: impl Into<Vec<u8>>) -> Self {
        Content::Bytes(Arc::from(content.into()))
    }
}

impl FlowRecord {
    /// A new record with fresh identity.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let id = Uuid::new_v4();
        let mut attrs = AttributeMap::new();
        attrs.insert(attributes::UUID, id.to_string());
        Self {
            id,
            parent_id: None,
            attributes: attrs,
            content: Content::bytes(content),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.attributes.insert(attributes::FILENAME, filename);
        self
    }

    /// A record whose content stays in the file at `path`.
    ///
    /// Only the file's metadata is read here; the bytes are read when the
    /// record is opened. The record is named after the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("{} is not a file", path.display())).into());
        }

        let mut record = FlowRecord::new(Vec::new());
        record.content = Content::File {
            path: Arc::new(path.to_path_buf()),
            size: metadata.len(),
        };
        if let Some(name) = path.file_name() {
            record.put_attribute(attributes::FILENAME, name.to_string_lossy());
        }
        if let Some(parent) = path.parent() {
            record.put_attribute(attributes::PATH, parent.to_string_lossy());
        }
        Ok(record)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    /// Content size in bytes. For a file-backed record this is the file
    /// length when the record was created.
    pub fn size(&self) -> u64 {
        match &self.content {
            Content::Bytes(bytes) => bytes.len() as u64,
            Content::File { size, .. } => *size,
        }
    }

    /// Whether the content is read from a file on demand.
    pub fn is_file_backed(&self) -> bool {
        matches!(self.content, Content::File { .. })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn filename(&self) -> Option<&str> {
        self.attribute(attributes::FILENAME)
    }

    /// Open the content for one read pass. The returned reader owns a handle
    /// to the content and releases it when dropped.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send + 'static>> {
        Ok(match &self.content {
            Content::Bytes(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
            Content::File { path, .. } => Box::new(BufReader::new(File::open(path.as_path())?)),
        })
    }

    /// Content held in memory, or `None` for a file-backed record.
    pub fn content(&self) -> Option<&[u8]> {
        match &self.content {
            Content::Bytes(bytes) => Some(&bytes[..]),
            Content::File { .. } => None,
        }
    }

    /// The full content, reading the file for a file-backed record.
    pub fn read_content(&self) -> io::Result<Cow<'_, [u8]>> {
        match &self.content {
            Content::Bytes(bytes) => Ok(Cow::Borrowed(&bytes[..])),
            Content::File { path, .. } => std::fs::read(path.as_path()).map(Cow::Owned),
        }
    }

    /// Derive a child record: new identity, same attributes and content.
    pub fn derive(&self) -> FlowRecord {
        let id = Uuid::new_v4();
        let mut attrs = self.attributes.clone();
        attrs.insert(attributes::UUID, id.to_string());
        FlowRecord {
            id,
            parent_id: Some(self.id),
            attributes: attrs,
            content: self.content.clone(),
        }
    }

    /// Replace the content of this record.
    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = Content::bytes(content);
        self
    }

    /// Set one attribute. Empty values are ignored.
    pub fn put_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key, value);
    }

    pub fn put_all_attributes(&mut self, attributes: &AttributeMap) {
        self.attributes.merge(attributes);
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.remove(key)
    }
}
