//! Bounded decoding and failure classification.
//!
//! [`ExtractionEngine`] sits between media type detection and normalization.
//! It rejects oversized input, picks a decoder, caps the extracted text and
//! folds every decoder error into a [`FailureReason`]. Nothing in here
//! returns `Err`: callers always get an [`ExtractionOutcome`].

use crate::core::config::ExtractionLimits;
use crate::plugins::{DecodeContext, DecoderRegistry, DocumentExtractor, PasswordProvider};
use crate::types::{AttributeMap, MediaTypeDescriptor, PropertyBag, keys};
use serde::Serialize;
use std::io::Read;
use std::sync::Arc;

/// Why an extraction produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("Media type detection failed: {message}")]
    Detection { message: String },

    #[error("Document of {size} bytes exceeds the limit of {limit} bytes")]
    ExceedsSizeLimit { size: u64, limit: u64 },

    #[error("Decoding failed: {message}")]
    Decode { message: String },

    #[error("Decoding produced no text")]
    EmptyResult,
}

impl FailureReason {
    pub fn detection(message: impl Into<String>) -> Self {
        Self::Detection {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Stable short name, suitable for attributes and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Detection { .. } => "detection_error",
            Self::ExceedsSizeLimit { .. } => "exceeds_size_limit",
            Self::Decode { .. } => "decode_error",
            Self::EmptyResult => "empty_result",
        }
    }
}

/// Text and normalized attributes of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedContent {
    pub text: String,
    pub attributes: AttributeMap,
}

/// Result of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Success(ExtractedContent),
    Failure(FailureReason),
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn content(&self) -> Option<&ExtractedContent> {
        match self {
            Self::Success(content) => Some(content),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

impl From<FailureReason> for ExtractionOutcome {
    fn from(reason: FailureReason) -> Self {
        Self::Failure(reason)
    }
}

/// Returned by [`TextSink::write`] once the character budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Write limit reached: extracted text exceeds {limit} characters")]
pub struct WriteLimitReached {
    pub limit: usize,
}

/// Collects extracted text up to a fixed number of characters.
#[derive(Debug, Default)]
pub struct TextSink {
    buffer: String,
    chars: usize,
    limit: Option<usize>,
}

impl TextSink {
    /// A sink holding at most `limit` characters; `None` is unbounded.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            buffer: String::new(),
            chars: 0,
            limit,
        }
    }

    /// Append `text`. On overflow the part that fits is kept and an error
    /// is returned.
    pub fn write(&mut self, text: &str) -> Result<(), WriteLimitReached> {
        let Some(limit) = self.limit else {
            self.chars += text.chars().count();
            self.buffer.push_str(text);
            return Ok(());
        };

        let remaining = limit - self.chars;
        match text.char_indices().nth(remaining) {
            None => {
                self.chars += text.chars().count();
                self.buffer.push_str(text);
                Ok(())
            }
            Some((cut, _)) => {
                self.buffer.push_str(&text[..cut]);
                self.chars = limit;
                Err(WriteLimitReached { limit })
            }
        }
    }

    pub fn char_count(&self) -> usize {
        self.chars
    }

    pub fn into_text(self) -> String {
        self.buffer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Convert,
    Metadata,
}

/// Dispatches content to decoders under [`ExtractionLimits`].
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    registry: Arc<DecoderRegistry>,
}

impl ExtractionEngine {
    pub fn new(registry: Arc<DecoderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<DecoderRegistry> {
        &self.registry
    }

    /// Size check done before any byte is read.
    pub fn check_size(size: u64, limits: &ExtractionLimits) -> Result<(), FailureReason> {
        match limits.max_bytes() {
            Some(limit) if size > limit => Err(FailureReason::ExceedsSizeLimit { size, limit }),
            _ => Ok(()),
        }
    }

    /// Decode `reader` to text and attributes.
    ///
    /// `size` is the declared content length. A zero-length text is an
    /// [`FailureReason::EmptyResult`].
    pub async fn extract<R: Read + Send>(
        &self,
        reader: R,
        size: u64,
        descriptor: &MediaTypeDescriptor,
        limits: &ExtractionLimits,
        resource_name: Option<&str>,
    ) -> ExtractionOutcome {
        self.run(Mode::Convert, reader, size, descriptor, limits, resource_name)
            .await
    }

    /// Like [`extract`](Self::extract), but an empty body is not a failure.
    pub async fn extract_metadata<R: Read + Send>(
        &self,
        reader: R,
        size: u64,
        descriptor: &MediaTypeDescriptor,
        limits: &ExtractionLimits,
        resource_name: Option<&str>,
    ) -> ExtractionOutcome {
        self.run(Mode::Metadata, reader, size, descriptor, limits, resource_name)
            .await
    }

    async fn run<R: Read + Send>(
        &self,
        mode: Mode,
        reader: R,
        size: u64,
        descriptor: &MediaTypeDescriptor,
        limits: &ExtractionLimits,
        resource_name: Option<&str>,
    ) -> ExtractionOutcome {
        let mime_type = descriptor.type_identifier.as_str();

        if let Err(reason) = Self::check_size(size, limits) {
            tracing::warn!(mime_type, size, limit = limits.max_input_bytes, "Rejecting oversized document");
            return reason.into();
        }

        let content = match read_bounded(reader, limits) {
            Ok(content) => content,
            Err(reason) => {
                tracing::warn!(mime_type, size, reason = %reason, "Failed to read document content");
                return reason.into();
            }
        };

        let decoder = self.registry.get(mime_type);

        let mut properties = PropertyBag::new();
        if let Some(name) = resource_name.filter(|name| !name.is_empty()) {
            properties.set(keys::RESOURCE_NAME, name);
        }
        properties.set(keys::CONTENT_TYPE, mime_type);

        let mut context = DecodeContext::new(properties.clone());
        if decoder.accepts_password()
            && let Some(password) = &limits.decode_password
        {
            let provider: Arc<dyn PasswordProvider> = Arc::new(password.clone());
            context = context.with_password_provider(provider);
        }

        let task = {
            let decoder = Arc::clone(&decoder);
            let mime_type = mime_type.to_string();
            tokio::spawn(async move { decoder.extract_bytes(&content, &mime_type, &context).await })
        };

        let result = match task.await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::error!(decoder = decoder.name(), mime_type, error = %e, "Decoder failed");
                return FailureReason::decode(e.to_string()).into();
            }
            Err(e) => {
                tracing::error!(decoder = decoder.name(), mime_type, error = %e, "Decoder task panicked");
                return FailureReason::decode(format!("Decoder {} panicked: {}", decoder.name(), e)).into();
            }
        };

        let mut sink = TextSink::new(limits.text_limit());
        if let Err(e) = sink.write(&result.content) {
            tracing::error!(decoder = decoder.name(), mime_type, limit = e.limit, "Extracted text exceeds write limit");
            return FailureReason::decode(e.to_string()).into();
        }
        let text = sink.into_text();

        if mode == Mode::Convert && text.is_empty() {
            tracing::warn!(decoder = decoder.name(), mime_type, "Decoder produced no text");
            return FailureReason::EmptyResult.into();
        }

        properties.extend(result.properties);
        properties.set(keys::PARSED_BY, decoder.name());

        tracing::debug!(decoder = decoder.name(), mime_type, chars = text.len(), "Extraction succeeded");

        ExtractionOutcome::Success(ExtractedContent {
            text,
            attributes: AttributeMap::from_properties(&properties),
        })
    }
}

/// Read the whole stream, failing once it runs past the byte bound.
fn read_bounded<R: Read>(reader: R, limits: &ExtractionLimits) -> Result<Vec<u8>, FailureReason> {
    let mut content = Vec::new();

    match limits.max_bytes() {
        Some(limit) => {
            reader
                .take(limit.saturating_add(1))
                .read_to_end(&mut content)
                .map_err(|e| FailureReason::detection(e.to_string()))?;
            if content.len() as u64 > limit {
                return Err(FailureReason::ExceedsSizeLimit {
                    size: content.len() as u64,
                    limit,
                });
            }
        }
        None => {
            let mut reader = reader;
            reader
                .read_to_end(&mut content)
                .map_err(|e| FailureReason::detection(e.to_string()))?;
        }
    }

    Ok(content)
}
