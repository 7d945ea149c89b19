//! Field catalog
//!
//! A validated, immutable list of field definitions. Build it once (from the
//! presets, a config file, or a request body) and share it by reference.

use std::collections::HashSet;
use std::path::Path;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use shared_types::{DataType, FieldDefinition};
use tracing::info;

use crate::error::CatalogError;

lazy_static! {
    static ref BUILTIN: FieldCatalog =
        FieldCatalog::new(presets()).expect("built-in field presets are valid");
}

/// Built-in field definitions, including Hindi aliases
pub fn presets() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new(
            "Name",
            &["name", "naam", "नाम", "नम", "full name", "patient name"],
            DataType::Text,
            false,
        ),
        FieldDefinition::new(
            "Age",
            &["age", "उम्र", "आयु", "years", "yrs"],
            DataType::Number,
            false,
        )
        .with_pattern(r"\b(\d{1,3})\s*(?:years?|yrs?|साल)?\b")
        .with_min_length(1),
        FieldDefinition::new(
            "Gender",
            &["gender", "sex", "लिंग", "जेंडर"],
            DataType::Text,
            false,
        )
        .with_pattern(r"\b(male|female|m|f|पुरुष|महिला|मर्द|औरत)\b")
        .with_min_length(1),
        FieldDefinition::new(
            "Phone",
            &["phone", "mobile", "contact", "फोन", "मोबाइल"],
            DataType::Phone,
            false,
        )
        .with_pattern(r"(?:\+?91[\s-]?)?[6-9]\d{2}[\s-]?\d{3}[\s-]?\d{4}\b"),
        FieldDefinition::new("Email", &["email", "mail", "ईमेल"], DataType::Email, false)
            .with_pattern(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
        FieldDefinition::new(
            "Address",
            &["address", "addr", "पता"],
            DataType::Text,
            false,
        ),
        FieldDefinition::new(
            "ID Number",
            &["id number", "id no", "id", "आईडी", "संख्या"],
            DataType::Alphanumeric,
            false,
        )
        .with_pattern(r"\b[A-Z0-9]{4,}\b"),
        FieldDefinition::new(
            "Date",
            &["date", "dated", "dob", "तारीख", "दिनांक"],
            DataType::Date,
            false,
        )
        .with_pattern(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b"),
    ]
}

/// Loosely-typed field record as callers send it. Anything omitted is
/// filled from a same-named preset, or from plain defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl FieldSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Resolve into a full definition, merging in the matching preset
    pub fn resolve(self) -> Result<FieldDefinition, CatalogError> {
        let name = self.name.trim().to_string();
        let key = preset_key(&name);
        let preset = presets().into_iter().find(|p| preset_key(&p.name) == key);

        let data_type = match self.data_type {
            Some(raw) => raw.parse::<DataType>().map_err(|_| CatalogError::UnknownDataType {
                field: name.clone(),
                data_type: raw,
            })?,
            None => preset.as_ref().map(|p| p.data_type).unwrap_or_default(),
        };

        let keywords = match self.keywords {
            Some(keywords) if keywords.iter().any(|k| !k.trim().is_empty()) => keywords,
            _ => preset
                .as_ref()
                .map(|p| p.keywords.clone())
                .unwrap_or_else(|| vec![name.to_lowercase()]),
        };

        let pattern = self
            .pattern
            .or_else(|| preset.as_ref().and_then(|p| p.pattern.clone()));

        let min_length = self
            .min_length
            .or_else(|| preset.as_ref().and_then(|p| p.min_length));
        let max_length = self
            .max_length
            .or_else(|| preset.as_ref().and_then(|p| p.max_length));

        Ok(FieldDefinition {
            name,
            keywords,
            data_type,
            required: self.required,
            pattern,
            min_length,
            max_length,
        })
    }
}

/// "ID Number", "id_number" and "id number" all name the same preset
fn preset_key(name: &str) -> String {
    name.trim().to_lowercase().replace('_', " ")
}

/// A catalog entry with its keywords folded and pattern compiled
#[derive(Debug, Clone)]
pub struct CatalogField {
    pub definition: FieldDefinition,
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

impl CatalogField {
    fn compile(definition: FieldDefinition) -> Result<Self, CatalogError> {
        let keywords: Vec<String> = definition
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let pattern = match &definition.pattern {
            Some(p) => Some(
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| CatalogError::InvalidPattern {
                        field: definition.name.clone(),
                        message: e.to_string(),
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            definition,
            keywords,
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Lowercased, non-empty keywords
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn data_type(&self) -> DataType {
        self.definition.data_type
    }

    pub fn required(&self) -> bool {
        self.definition.required
    }
}

#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: Vec<CatalogField>,
}

impl FieldCatalog {
    /// Validate and compile a list of definitions, keeping their order
    pub fn new(definitions: Vec<FieldDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(definitions.len());

        for mut definition in definitions {
            definition.name = definition.name.trim().to_string();
            if definition.name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !seen.insert(definition.name.to_lowercase()) {
                return Err(CatalogError::DuplicateField(definition.name));
            }
            if let (Some(min), Some(max)) = (definition.min_length, definition.max_length) {
                if min > max {
                    return Err(CatalogError::InvalidLength {
                        field: definition.name,
                        min,
                        max,
                    });
                }
            }
            if definition.keywords.iter().all(|k| k.trim().is_empty()) {
                definition.keywords = vec![definition.name.to_lowercase()];
            }
            fields.push(CatalogField::compile(definition)?);
        }

        Ok(Self { fields })
    }

    /// Build from loose records, merging presets
    pub fn from_specs(specs: Vec<FieldSpec>) -> Result<Self, CatalogError> {
        let definitions = specs
            .into_iter()
            .map(FieldSpec::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(definitions)
    }

    /// The preset catalog
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogField> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn definitions(&self) -> Vec<FieldDefinition> {
        self.fields.iter().map(|f| f.definition.clone()).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<FieldSpec>),
    Wrapped { fields: Vec<FieldSpec> },
}

/// Load a catalog from a JSON (`.json`) or YAML (anything else) file
pub fn load_catalog(path: &Path) -> Result<FieldCatalog, CatalogError> {
    let path_str = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path_str.clone(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let file: CatalogFile = if is_json {
        serde_json::from_str(&raw).map_err(|e| CatalogError::Parse {
            path: path_str.clone(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&raw).map_err(|e| CatalogError::Parse {
            path: path_str.clone(),
            message: e.to_string(),
        })?
    };

    let specs = match file {
        CatalogFile::List(specs) | CatalogFile::Wrapped { fields: specs } => specs,
    };

    let catalog = FieldCatalog::from_specs(specs)?;
    info!("Loaded {} field definitions from {}", catalog.len(), path_str);
    Ok(catalog)
}
