//! Decoder trait and the context handed to each decode call.

use crate::Result;
use crate::core::config::SecretString;
use crate::plugins::Plugin;
use crate::types::{ExtractionResult, PropertyBag};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Supplies passwords for encrypted documents.
///
/// Called with the properties gathered so far (at least `resourceName`
/// when a filename is known), so a provider may pick a password per document.
pub trait PasswordProvider: Send + Sync {
    fn password(&self, properties: &PropertyBag) -> Option<SecretString>;
}

impl PasswordProvider for SecretString {
    fn password(&self, _properties: &PropertyBag) -> Option<SecretString> {
        Some(self.clone())
    }
}

/// Per-call inputs to a decoder.
#[derive(Clone, Default)]
pub struct DecodeContext {
    /// Properties known before decoding (resource name, detected type).
    pub properties: PropertyBag,
    /// Only set for decoders whose [`DocumentExtractor::accepts_password`] is true.
    pub password_provider: Option<Arc<dyn PasswordProvider>>,
}

impl DecodeContext {
    pub fn new(properties: PropertyBag) -> Self {
        Self {
            properties,
            password_provider: None,
        }
    }

    pub fn with_password_provider(mut self, provider: Arc<dyn PasswordProvider>) -> Self {
        self.password_provider = Some(provider);
        self
    }

    /// Ask the provider, if any, for a password.
    pub fn password(&self) -> Option<SecretString> {
        self.password_provider
            .as_ref()
            .and_then(|provider| provider.password(&self.properties))
    }
}

impl fmt::Debug for DecodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeContext")
            .field("properties", &self.properties)
            .field("password_provider", &self.password_provider.is_some())
            .finish()
    }
}

/// A format-specific decoder.
///
/// Decoders turn the full document bytes into body text plus a property bag.
/// They report structural problems as `Err`; the engine turns those into a
/// typed failure outcome.
#[async_trait]
pub trait DocumentExtractor: Plugin {
    async fn extract_bytes(&self, content: &[u8], mime_type: &str, context: &DecodeContext)
    -> Result<ExtractionResult>;

    /// Media types this decoder handles. `type/*` wildcards are allowed.
    fn supported_mime_types(&self) -> &[&str];

    /// Higher wins when several decoders claim the same type.
    fn priority(&self) -> i32 {
        50
    }

    /// Whether the decoder understands password-protected content.
    fn accepts_password(&self) -> bool {
        false
    }
}
