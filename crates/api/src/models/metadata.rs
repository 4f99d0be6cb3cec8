use super::name::CanonicalName;
use super::raw::{RawDeprecation, RawGroup, RawHint, RawProperty, RawValueHint, RawValueProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// How strongly a property is deprecated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeprecationLevel {
    #[default]
    None,
    Warning,
    /// The property is no longer bound at all.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deprecation {
    pub level: DeprecationLevel,
    pub reason: Option<String>,
    pub replacement: Option<String>,
    pub since: Option<String>,
}

/// A declared group: a namespace with a backing type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub name: CanonicalName,
    pub type_name: Option<String>,
    pub source_type: Option<String>,
    pub source_method: Option<String>,
    pub description: Option<String>,
}

/// A declared leaf property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub name: CanonicalName,
    pub type_name: Option<String>,
    pub source_type: Option<String>,
    pub description: Option<String>,
    /// JSON text of the declared default.
    pub default_value: Option<String>,
    pub deprecation: Option<Deprecation>,
}

impl Property {
    pub fn deprecation_level(&self) -> DeprecationLevel {
        self.deprecation
            .as_ref()
            .map_or(DeprecationLevel::None, |d| d.level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueHint {
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueProvider {
    pub name: String,
    /// Parameter values kept as JSON text.
    pub parameters: BTreeMap<String, String>,
}

/// Value or key hints attached to a property name (or `<name>.keys` / `<name>.values`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hint {
    pub name: CanonicalName,
    pub values: Vec<ValueHint>,
    pub providers: Vec<ValueProvider>,
}

/// One metadata record stored in an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataItem {
    Group(Arc<Group>),
    Property(Arc<Property>),
    Hint(Arc<Hint>),
}

impl MetadataItem {
    pub fn name(&self) -> &CanonicalName {
        match self {
            MetadataItem::Group(g) => &g.name,
            MetadataItem::Property(p) => &p.name,
            MetadataItem::Hint(h) => &h.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MetadataItem::Group(_) => "group",
            MetadataItem::Property(_) => "property",
            MetadataItem::Hint(_) => "hint",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            MetadataItem::Group(g) => g.description.as_deref(),
            MetadataItem::Property(p) => p.description.as_deref(),
            MetadataItem::Hint(_) => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            MetadataItem::Group(g) => g.type_name.as_deref(),
            MetadataItem::Property(p) => p.type_name.as_deref(),
            MetadataItem::Hint(_) => None,
        }
    }

    pub fn as_property(&self) -> Option<&Arc<Property>> {
        match self {
            MetadataItem::Property(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

/// A hint value ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HintValue {
    pub value: String,
    pub one_line_description: Option<String>,
    pub description: Option<String>,
}

impl HintValue {
    pub fn new(value: impl Into<String>, description: Option<String>) -> Self {
        let one_line_description = description.as_deref().and_then(first_sentence);
        Self {
            value: value.into(),
            one_line_description,
            description,
        }
    }
}

impl From<&ValueHint> for HintValue {
    fn from(hint: &ValueHint) -> Self {
        HintValue::new(hint.value.clone(), hint.description.clone())
    }
}

/// First sentence of a description, without the trailing period.
pub fn first_sentence(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let line = text.lines().next().unwrap_or(text);
    let end = line
        .match_indices(". ")
        .next()
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let sentence = line[..end].trim_end_matches('.').trim();
    (!sentence.is_empty()).then(|| sentence.to_string())
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<&RawGroup> for Group {
    fn from(raw: &RawGroup) -> Self {
        Self {
            name: CanonicalName::adapt(&raw.name),
            type_name: raw.type_name.clone(),
            source_type: raw.source_type.clone(),
            source_method: raw.source_method.clone(),
            description: raw.description.clone(),
        }
    }
}

impl From<&RawDeprecation> for Deprecation {
    fn from(raw: &RawDeprecation) -> Self {
        let level = match raw.level.as_deref() {
            Some(level) if level.eq_ignore_ascii_case("error") => DeprecationLevel::Error,
            _ => DeprecationLevel::Warning,
        };
        Self {
            level,
            reason: raw.reason.clone(),
            replacement: raw.replacement.clone(),
            since: raw.since.clone(),
        }
    }
}

impl From<&RawProperty> for Property {
    fn from(raw: &RawProperty) -> Self {
        let deprecation = match (&raw.deprecation, raw.deprecated) {
            (Some(d), _) => Some(Deprecation::from(d)),
            (None, true) => Some(Deprecation {
                level: DeprecationLevel::Warning,
                reason: None,
                replacement: None,
                since: None,
            }),
            (None, false) => None,
        };
        Self {
            name: CanonicalName::adapt(&raw.name),
            type_name: raw.type_name.clone(),
            source_type: raw.source_type.clone(),
            description: raw.description.clone(),
            default_value: raw.default_value.as_ref().map(json_text),
            deprecation,
        }
    }
}

impl From<&RawValueHint> for ValueHint {
    fn from(raw: &RawValueHint) -> Self {
        Self {
            value: json_text(&raw.value),
            description: raw.description.clone(),
        }
    }
}

impl From<&RawValueProvider> for ValueProvider {
    fn from(raw: &RawValueProvider) -> Self {
        Self {
            name: raw.name.clone(),
            parameters: raw
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), json_text(v)))
                .collect(),
        }
    }
}

impl From<&RawHint> for Hint {
    fn from(raw: &RawHint) -> Self {
        Self {
            name: CanonicalName::adapt(&raw.name),
            values: raw.values.iter().map(ValueHint::from).collect(),
            providers: raw.providers.iter().map(ValueProvider::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raw::ConfigurationMetadata;

    #[test]
    fn test_first_sentence() {
        assert_eq!(
            first_sentence("Server HTTP port. Defaults to 8080."),
            Some("Server HTTP port".to_string())
        );
        assert_eq!(
            first_sentence("Version 1.2 of the protocol"),
            Some("Version 1.2 of the protocol".to_string())
        );
        assert_eq!(
            first_sentence("First line\nsecond line"),
            Some("First line".to_string())
        );
        assert_eq!(first_sentence("   "), None);
    }

    #[test]
    fn test_conversion_from_raw_document() {
        let json = r#"{
            "properties": [
                {"name": "server.port", "type": "java.lang.Integer", "defaultValue": 8080},
                {"name": "server.old", "deprecated": true},
                {"name": "server.gone", "deprecation": {"level": "error", "replacement": "server.new"}}
            ],
            "hints": [
                {"name": "server.mode", "values": [{"value": true, "description": "On. Really."}]}
            ]
        }"#;
        let doc: ConfigurationMetadata = serde_json::from_str(json).unwrap();

        let port = Property::from(&doc.properties[0]);
        assert_eq!(port.default_value.as_deref(), Some("8080"));
        assert_eq!(port.deprecation_level(), DeprecationLevel::None);

        let old = Property::from(&doc.properties[1]);
        assert_eq!(old.deprecation_level(), DeprecationLevel::Warning);

        let gone = Property::from(&doc.properties[2]);
        assert_eq!(gone.deprecation_level(), DeprecationLevel::Error);
        assert_eq!(
            gone.deprecation.unwrap().replacement.as_deref(),
            Some("server.new")
        );

        let hint = Hint::from(&doc.hints[0]);
        assert_eq!(hint.values[0].value, "true");
        let value = HintValue::from(&hint.values[0]);
        assert_eq!(value.one_line_description.as_deref(), Some("On"));
    }
}
