//! Decoder plugin system.
//!
//! - [`Plugin`] - naming and lifecycle shared by every decoder
//! - [`DocumentExtractor`] - turns document bytes into text plus properties
//! - [`DecoderRegistry`] - media type to decoder dispatch
//!
//! Decoders are stored as `Arc<dyn DocumentExtractor>` and registered on an
//! explicitly constructed registry:
//!
//! ```rust
//! use docflow::plugins::DecoderRegistry;
//! use docflow::extractors::PlainTextExtractor;
//! use std::sync::Arc;
//!
//! let mut registry = DecoderRegistry::new();
//! registry.register(Arc::new(PlainTextExtractor::new()))?;
//! let registry = Arc::new(registry);
//!
//! assert_eq!(registry.get("text/plain").name(), "plain-text-extractor");
//! # Ok::<(), docflow::DocflowError>(())
//! ```

mod extractor;
pub mod registry;
mod traits;

pub use extractor::{DecodeContext, DocumentExtractor, PasswordProvider};
pub use registry::DecoderRegistry;
pub use traits::Plugin;
