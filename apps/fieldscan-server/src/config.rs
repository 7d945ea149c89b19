//! Service configuration
//!
//! Optional YAML file with `ocr`, `validation`, `matching` and `fields`
//! sections. Every section falls back to defaults, so an empty or missing
//! file is a valid configuration.

use std::path::{Path, PathBuf};

use field_engine::{
    load_catalog, CatalogError, EngineConfig, FieldCatalog, FieldSpec, MatchPolicy,
    ValidationConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Confidence threshold applied when a request does not set one
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("confidence threshold {0} is outside [0, 1]")]
    Threshold(f64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Recognition-side settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    pub confidence_threshold: f64,
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Where the default field catalog comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldsSection {
    /// Catalog file (YAML or JSON)
    pub catalog_path: Option<PathBuf>,
    /// Inline definitions, used when no catalog file is given
    pub definitions: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub ocr: OcrSection,
    pub validation: ValidationConfig,
    pub matching: MatchPolicy,
    pub fields: FieldsSection,
}

impl ServiceConfig {
    /// Read a config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Config file {} does not exist; using defaults", path.display());
            return Ok(Self::default());
        }

        let path_str = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        let config = Self::parse(&raw, &path_str)?;

        info!("Loaded config from {}", path_str);
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Self::parse(raw, "<inline>")
    }

    fn parse(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty document parses as null; treat it as "all defaults"
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let threshold = self.ocr.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Threshold(threshold));
        }
        Ok(())
    }

    /// Engine settings for one request at the given threshold
    pub fn engine_config(&self, min_confidence: f64) -> EngineConfig {
        EngineConfig {
            validation: self.validation.clone(),
            matching: self.matching,
            min_confidence,
        }
    }

    /// Default catalog: `override_path`, then the configured file, then
    /// inline definitions, then the built-in presets
    pub fn catalog(&self, override_path: Option<&Path>) -> Result<FieldCatalog, ConfigError> {
        if let Some(path) = override_path.or(self.fields.catalog_path.as_deref()) {
            return Ok(load_catalog(path)?);
        }
        if !self.fields.definitions.is_empty() {
            return Ok(FieldCatalog::from_specs(self.fields.definitions.clone())?);
        }
        Ok(FieldCatalog::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_engine::{KeywordMode, ValueSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        let config = ServiceConfig::from_yaml("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.ocr.confidence_threshold, 0.7);
    }

    #[test]
    fn test_parses_all_sections() {
        let raw = r#"
ocr:
  confidence_threshold: 0.5
validation:
  min_text_length: 3
  allowed_chars: "abc"
matching:
  keyword_mode: word_boundary
  value_source: residual_only
fields:
  definitions:
    - name: Name
      required: true
    - name: Ward
      keywords: [ward]
"#;
        let config = ServiceConfig::from_yaml(raw).unwrap();
        assert_eq!(config.ocr.confidence_threshold, 0.5);
        assert_eq!(config.validation.min_length, 3);
        assert_eq!(config.validation.max_length, 1000);
        assert_eq!(config.matching.keyword_mode, KeywordMode::WordBoundary);
        assert_eq!(config.matching.value_source, ValueSource::ResidualOnly);

        let catalog = config.catalog(None).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("Name").unwrap().required());
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let err = ServiceConfig::from_yaml("ocr:\n  confidence_threshold: 7\n").unwrap_err();
        assert!(matches!(err, ConfigError::Threshold(_)));
    }

    #[test]
    fn test_rejects_bad_catalog() {
        let raw = "fields:\n  definitions:\n    - name: A\n    - name: a\n";
        let config = ServiceConfig::from_yaml(raw).unwrap();
        assert!(matches!(
            config.catalog(None),
            Err(ConfigError::Catalog(CatalogError::DuplicateField(_)))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults_and_builtin_catalog() {
        let config = ServiceConfig::load(Path::new("/nonexistent/fieldscan.yaml")).unwrap();
        assert_eq!(config.catalog(None).unwrap().len(), FieldCatalog::builtin().len());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fieldscan.yaml");
        std::fs::write(&path, "ocr:\n  confidence_threshold: 0.9\n").unwrap();
        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.ocr.confidence_threshold, 0.9);
        assert_eq!(config.engine_config(0.9).min_confidence, 0.9);
    }
}
