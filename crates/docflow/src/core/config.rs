//! Pipeline configuration and extraction limits.
//!
//! [`ExtractionLimits`] is the immutable per-invocation bound handed to the
//! engine. [`PipelineConfig`] is the file-loadable surface a host reads once
//! at startup and turns into limits plus detector settings.

use crate::{DocflowError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default input bound: 1 MB.
pub const DEFAULT_MAX_INPUT_BYTES: i64 = 1_048_576;

/// Default number of leading bytes the detector inspects.
pub const DEFAULT_DETECTION_PREFIX_BYTES: usize = 64 * 1024;

/// Default LibreOffice conversion timeout in seconds.
pub const DEFAULT_LIBREOFFICE_TIMEOUT_SECS: u64 = 300;

/// A password or other secret that must never show up in logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Bounds applied to one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionLimits {
    /// Maximum accepted input size in bytes. Zero or negative means unlimited.
    /// The same value caps the number of characters of extracted text.
    pub max_input_bytes: i64,
    /// Password handed to decoders that accept one.
    pub decode_password: Option<SecretString>,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            decode_password: None,
        }
    }
}

impl ExtractionLimits {
    pub fn new(max_input_bytes: i64) -> Self {
        Self {
            max_input_bytes,
            decode_password: None,
        }
    }

    /// Limits with no size or text bound.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn with_password(mut self, password: impl Into<SecretString>) -> Self {
        self.decode_password = Some(password.into());
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_input_bytes > 0
    }

    /// The positive byte bound, if any.
    pub fn max_bytes(&self) -> Option<u64> {
        if self.is_bounded() {
            Some(self.max_input_bytes as u64)
        } else {
            None
        }
    }

    /// Whether a document of `size` bytes must be rejected up front.
    pub fn exceeds(&self, size: u64) -> bool {
        self.max_bytes().is_some_and(|max| size > max)
    }

    /// Character capacity of the extracted-text sink.
    pub fn text_limit(&self) -> Option<usize> {
        self.max_bytes().map(|max| usize::try_from(max).unwrap_or(usize::MAX))
    }

    /// Reject configurations a host should never hand to the engine.
    pub fn validate(&self) -> Result<()> {
        if let Some(password) = &self.decode_password
            && password.is_empty()
        {
            return Err(DocflowError::validation(
                "decode_password must not be empty when present",
            ));
        }
        Ok(())
    }
}

/// A byte quantity written the way flow hosts usually express it:
/// `"1 MB"`, `"512KB"`, `"1048576 B"`, `"1.5 GB"` or a bare integer.
/// Units are powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataSize(u64);

const UNITS: [(&str, u64); 5] = [
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
    ("B", 1),
];

impl DataSize {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(self) -> u64 {
        self.0
    }
}

impl Default for DataSize {
    fn default() -> Self {
        Self(DEFAULT_MAX_INPUT_BYTES as u64)
    }
}

impl FromStr for DataSize {
    type Err = DocflowError;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let unit = unit.trim().to_ascii_uppercase();

        if number.is_empty() {
            return Err(DocflowError::validation(format!("Invalid data size '{}'", input)));
        }

        let multiplier = if unit.is_empty() {
            1
        } else {
            UNITS
                .iter()
                .find(|(name, _)| *name == unit)
                .map(|(_, factor)| *factor)
                .ok_or_else(|| DocflowError::validation(format!("Unknown data size unit '{}' in '{}'", unit, input)))?
        };

        if let Ok(whole) = number.parse::<u64>() {
            return whole
                .checked_mul(multiplier)
                .map(DataSize)
                .ok_or_else(|| DocflowError::validation(format!("Data size '{}' overflows", input)));
        }

        let fractional: f64 = number
            .parse()
            .map_err(|_| DocflowError::validation(format!("Invalid data size '{}'", input)))?;
        let bytes = fractional * multiplier as f64;
        if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
            return Err(DocflowError::validation(format!("Data size '{}' out of range", input)));
        }
        Ok(DataSize(bytes.round() as u64))
    }
}

impl fmt::Display for DataSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, factor) in UNITS {
            if self.0 >= factor && self.0 % factor == 0 {
                return write!(f, "{} {}", self.0 / factor, name);
            }
        }
        write!(f, "{} B", self.0)
    }
}

impl Serialize for DataSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bytes(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bytes(bytes) => Ok(DataSize(bytes)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// File-loadable pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest document accepted for conversion; `0` disables the bound.
    pub max_input_size: DataSize,

    /// Password for encrypted documents. Never serialized.
    #[serde(skip_serializing)]
    pub decode_password: Option<SecretString>,

    /// Whether the metadata pipeline applies `max_input_size` as well.
    pub bound_metadata_extraction: bool,

    /// Number of leading bytes inspected during media type detection.
    pub detection_prefix_bytes: usize,

    /// Upper bound on documents processed concurrently by batch helpers.
    pub max_concurrent_extractions: Option<usize>,

    /// Timeout for external LibreOffice conversions.
    pub libreoffice_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_input_size: DataSize::default(),
            decode_password: None,
            bound_metadata_extraction: true,
            detection_prefix_bytes: DEFAULT_DETECTION_PREFIX_BYTES,
            max_concurrent_extractions: None,
            libreoffice_timeout_secs: DEFAULT_LIBREOFFICE_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    /// Limits for the conversion pipeline.
    pub fn limits(&self) -> ExtractionLimits {
        ExtractionLimits {
            max_input_bytes: i64::try_from(self.max_input_size.as_bytes()).unwrap_or(i64::MAX),
            decode_password: self.decode_password.clone(),
        }
    }

    /// Limits for the metadata pipeline.
    pub fn metadata_limits(&self) -> ExtractionLimits {
        if self.bound_metadata_extraction {
            self.limits()
        } else {
            ExtractionLimits {
                decode_password: self.decode_password.clone(),
                ..ExtractionLimits::unbounded()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.detection_prefix_bytes == 0 {
            return Err(DocflowError::validation("detection_prefix_bytes must be greater than zero"));
        }
        if self.max_concurrent_extractions == Some(0) {
            return Err(DocflowError::validation(
                "max_concurrent_extractions must be greater than zero",
            ));
        }
        self.limits().validate()
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocflowError::Validation` if the file can't be read, isn't
    /// valid TOML, or fails [`PipelineConfig::validate`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DocflowError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| DocflowError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DocflowError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DocflowError::validation(format!(
                "Unsupported config format for {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Search for `docflow.toml` in the current directory and its parents.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DocflowError::Io)?;

        loop {
            let candidate = current.join("docflow.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocflowError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_limits() {
        let limits = ExtractionLimits::default();
        assert_eq!(limits.max_input_bytes, 1_048_576);
        assert!(limits.decode_password.is_none());
        assert!(limits.exceeds(1_048_577));
        assert!(!limits.exceeds(1_048_576));
    }

    #[test]
    fn test_non_positive_limit_is_unbounded() {
        for max in [0, -1, i64::MIN] {
            let limits = ExtractionLimits::new(max);
            assert!(!limits.is_bounded());
            assert!(!limits.exceeds(u64::MAX));
            assert!(limits.text_limit().is_none());
        }
    }

    #[test]
    fn test_secret_is_redacted() {
        let limits = ExtractionLimits::default().with_password("hunter2");
        let debug = format!("{:?}", limits);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_empty_password_rejected() {
        let limits = ExtractionLimits::default().with_password("");
        assert!(matches!(limits.validate(), Err(DocflowError::Validation { .. })));
    }

    #[test]
    fn test_data_size_parsing() {
        assert_eq!("1 MB".parse::<DataSize>().unwrap().as_bytes(), 1_048_576);
        assert_eq!("1MB".parse::<DataSize>().unwrap().as_bytes(), 1_048_576);
        assert_eq!("512 kb".parse::<DataSize>().unwrap().as_bytes(), 524_288);
        assert_eq!("1048576 B".parse::<DataSize>().unwrap().as_bytes(), 1_048_576);
        assert_eq!("42".parse::<DataSize>().unwrap().as_bytes(), 42);
        assert_eq!("1.5 KB".parse::<DataSize>().unwrap().as_bytes(), 1536);
        assert_eq!("2 GB".parse::<DataSize>().unwrap().as_bytes(), 2 * (1 << 30));
    }

    #[test]
    fn test_data_size_rejects_garbage() {
        assert!("".parse::<DataSize>().is_err());
        assert!("MB".parse::<DataSize>().is_err());
        assert!("10 parsecs".parse::<DataSize>().is_err());
        assert!("1.2.3 MB".parse::<DataSize>().is_err());
    }

    #[test]
    fn test_data_size_display() {
        assert_eq!(DataSize::from_bytes(1_048_576).to_string(), "1 MB");
        assert_eq!(DataSize::from_bytes(1536).to_string(), "1536 B");
        assert_eq!(DataSize::from_bytes(0).to_string(), "0 B");
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docflow.toml");

        fs::write(
            &config_path,
            r#"
max_input_size = "2 MB"
decode_password = "test"
bound_metadata_extraction = false
        "#,
        )
        .unwrap();

        let config = PipelineConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.max_input_size.as_bytes(), 2 * 1_048_576);
        assert_eq!(config.limits().decode_password.as_ref().map(|p| p.expose()), Some("test"));
        assert!(!config.metadata_limits().is_bounded());
        assert_eq!(config.detection_prefix_bytes, DEFAULT_DETECTION_PREFIX_BYTES);
    }

    #[test]
    fn test_from_json_file_with_integer_size() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docflow.json");
        fs::write(&config_path, r#"{"max_input_size": 4096}"#).unwrap();

        let config = PipelineConfig::from_file(&config_path).unwrap();
        assert_eq!(config.limits().max_input_bytes, 4096);
        assert!(config.metadata_limits().is_bounded());
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docflow.yaml");
        fs::write(&config_path, "max_input_size: 0 B\nmax_concurrent_extractions: 4\n").unwrap();

        let config = PipelineConfig::from_file(&config_path).unwrap();
        assert!(!config.limits().is_bounded());
        assert_eq!(config.max_concurrent_extractions, Some(4));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docflow.toml");
        fs::write(&config_path, "decode_password = \"\"\n").unwrap();

        let err = PipelineConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, DocflowError::Validation { .. }));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = PipelineConfig::from_file("settings.ini").unwrap_err();
        assert!(err.to_string().contains("Unsupported config format"));
    }

    #[test]
    fn test_password_not_serialized() {
        let config = PipelineConfig {
            decode_password: Some(SecretString::new("hunter2")),
            ..PipelineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("\"1 MB\""));
    }
}
