//! Decoder registration and lookup.
//!
//! A [`DecoderRegistry`] is filled once at startup and then shared behind an
//! `Arc`; lookups take `&self` and never fail. There is no process-wide
//! registry: every pipeline is handed the registry it should use.

use crate::core::config::PipelineConfig;
use crate::extractors::FallbackExtractor;
use crate::plugins::DocumentExtractor;
use crate::{DocflowError, Result};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocflowError::validation("Plugin name cannot be empty"));
    }

    if name.contains(char::is_whitespace) {
        return Err(DocflowError::validation(format!(
            "Plugin name '{}' cannot contain whitespace",
            name
        )));
    }

    Ok(())
}

/// Maps media types to decoders, by priority.
pub struct DecoderRegistry {
    extractors: HashMap<String, BTreeMap<i32, Arc<dyn DocumentExtractor>>>,
    name_index: HashMap<String, Vec<(String, i32)>>,
    fallback: Arc<dyn DocumentExtractor>,
}

impl DecoderRegistry {
    /// An empty registry whose only decoder is the generic fallback.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            name_index: HashMap::new(),
            fallback: Arc::new(FallbackExtractor::new()),
        }
    }

    /// A registry holding every built-in decoder enabled by crate features.
    pub fn with_defaults(config: &PipelineConfig) -> Result<Self> {
        crate::extractors::default_registry(config)
    }

    /// Register a decoder for every media type it declares.
    ///
    /// Validates the name and calls `initialize`. A decoder registered with
    /// the same priority for the same type replaces the earlier one.
    pub fn register(&mut self, extractor: Arc<dyn DocumentExtractor>) -> Result<()> {
        let name = extractor.name().to_string();
        let priority = extractor.priority();
        let mime_types: Vec<String> = extractor.supported_mime_types().iter().map(|s| s.to_string()).collect();

        validate_plugin_name(&name)?;

        if self.name_index.contains_key(&name) {
            return Err(DocflowError::plugin("Decoder already registered", name));
        }

        extractor.initialize()?;

        let mut index_entries = Vec::new();

        for mime_type in &mime_types {
            self.extractors
                .entry(mime_type.clone())
                .or_default()
                .insert(priority, Arc::clone(&extractor));
            index_entries.push((mime_type.clone(), priority));
        }

        tracing::debug!(decoder = %name, priority, types = ?mime_types, "Registered decoder");
        self.name_index.insert(name, index_entries);

        Ok(())
    }

    /// Replace the decoder used when nothing else matches.
    pub fn set_fallback(&mut self, fallback: Arc<dyn DocumentExtractor>) -> Result<()> {
        validate_plugin_name(fallback.name())?;
        fallback.initialize()?;
        self.fallback = fallback;
        Ok(())
    }

    /// Best decoder for `mime_type`, or `None` when only the fallback would do.
    ///
    /// An exact registration wins; otherwise the highest-priority `type/*`
    /// wildcard whose prefix matches.
    pub fn find(&self, mime_type: &str) -> Option<Arc<dyn DocumentExtractor>> {
        if let Some(priority_map) = self.extractors.get(mime_type)
            && let Some((_priority, extractor)) = priority_map.iter().next_back()
        {
            return Some(Arc::clone(extractor));
        }

        let mut best_match: Option<(i32, Arc<dyn DocumentExtractor>)> = None;

        for (registered_mime, priority_map) in &self.extractors {
            let Some(prefix) = registered_mime.strip_suffix('*') else {
                continue;
            };
            if !prefix.ends_with('/') || !mime_type.starts_with(prefix) {
                continue;
            }
            if let Some((&priority, extractor)) = priority_map.iter().next_back() {
                match &best_match {
                    Some((current, _)) if *current >= priority => {}
                    _ => best_match = Some((priority, Arc::clone(extractor))),
                }
            }
        }

        best_match.map(|(_priority, extractor)| extractor)
    }

    /// Decoder for `mime_type`, falling back to the generic decoder.
    pub fn get(&self, mime_type: &str) -> Arc<dyn DocumentExtractor> {
        self.find(mime_type).unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub fn fallback(&self) -> Arc<dyn DocumentExtractor> {
        Arc::clone(&self.fallback)
    }

    /// Names of all registered decoders, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Media types with at least one registered decoder, sorted.
    pub fn supported_mime_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.extractors.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        let index_entries = match self.name_index.remove(name) {
            Some(entries) => entries,
            None => return Ok(()),
        };

        let mut extractor_to_shutdown: Option<Arc<dyn DocumentExtractor>> = None;

        for (mime_type, priority) in index_entries {
            if let Some(priority_map) = self.extractors.get_mut(&mime_type) {
                if let Some(extractor) = priority_map.remove(&priority)
                    && extractor_to_shutdown.is_none()
                {
                    extractor_to_shutdown = Some(extractor);
                }

                if priority_map.is_empty() {
                    self.extractors.remove(&mime_type);
                }
            }
        }

        if let Some(extractor) = extractor_to_shutdown {
            extractor.shutdown()?;
        }

        Ok(())
    }

    pub fn shutdown_all(&mut self) -> Result<()> {
        for name in self.list() {
            self.remove(&name)?;
        }
        self.fallback.shutdown()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("decoders", &self.list())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
