//! Error types for docflow.
//!
//! `DocflowError` is the library-level error returned by decoders, config
//! loading and registry operations. It is distinct from
//! [`FailureReason`](crate::core::engine::FailureReason), which is the typed
//! per-document outcome a pipeline hands to the router.
//!
//! **System errors bubble up unchanged:**
//! - `DocflowError::Io` (from `std::io::Error`)
//!
//! **Application errors carry context:**
//! - `Parsing` - malformed documents, wrong passwords, truncated containers
//! - `Validation` - invalid configuration or plugin registration
//! - `MissingDependency` - an external tool (LibreOffice) is not installed
//!
//! # Example
//!
//! ```rust
//! use docflow::{DocflowError, Result};
//!
//! fn read_note(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!     if content.is_empty() {
//!         return Err(DocflowError::validation(format!("File is empty: {}", path)));
//!     }
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocflowError>;

#[derive(Debug, Error)]
pub enum DocflowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for DocflowError {
    fn from(err: serde_json::Error) -> Self {
        DocflowError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "office")]
impl From<zip::result::ZipError> for DocflowError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => DocflowError::parsing_with_source("Failed to read archive", io_err),
            other => DocflowError::Parsing {
                message: format!("Invalid archive: {}", other),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(feature = "office")]
impl From<roxmltree::Error> for DocflowError {
    fn from(err: roxmltree::Error) -> Self {
        DocflowError::Parsing {
            message: format!("Malformed XML: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::pdf::error::PdfError> for DocflowError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        DocflowError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocflowError {
    error_constructor!(parsing, Parsing);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    /// Create a plugin error attributed to `plugin_name`.
    pub fn plugin<S: Into<String>, N: Into<String>>(message: S, plugin_name: N) -> Self {
        Self::Plugin {
            message: message.into(),
            plugin_name: plugin_name.into(),
        }
    }
}
