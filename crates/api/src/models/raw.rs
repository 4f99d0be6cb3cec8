//! Serde model of `spring-configuration-metadata.json` documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationMetadata {
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    #[serde(default)]
    pub hints: Vec<RawHint>,
}

impl ConfigurationMetadata {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.properties.is_empty() && self.hints.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGroup {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProperty {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    /// Legacy flag predating the `deprecation` object.
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeprecation {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub replacement: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHint {
    pub name: String,
    #[serde(default)]
    pub values: Vec<RawValueHint>,
    #[serde(default)]
    pub providers: Vec<RawValueProvider>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawValueHint {
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawValueProvider {
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let doc: ConfigurationMetadata = serde_json::from_str("{}").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{"groups": [{"name": "server", "type": "a.ServerProperties", "sourceType": "a.ServerProperties", "sourceMethod": "server()"}]}"#;
        let doc: ConfigurationMetadata = serde_json::from_str(json).unwrap();
        let group = &doc.groups[0];
        assert_eq!(group.type_name.as_deref(), Some("a.ServerProperties"));
        assert_eq!(group.source_method.as_deref(), Some("server()"));
    }
}
