//! Key and value suggestions built on top of [`CompletionSearch`].

use super::completion::CompletionSearch;
use super::property::PropertyView;
use crate::index::MetadataIndex;
use keyscope_api::{CanonicalName, DeprecationLevel, HintValue, MetadataItem, TypeOracle};

/// One entry offered while typing a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySuggestion {
    /// A declared group or property, with the text to insert after the parent.
    Item {
        item: MetadataItem,
        insert_text: String,
    },
    /// A map key taken from the parent property's key hints.
    Key(HintValue),
}

impl KeySuggestion {
    pub fn insert_text(&self) -> &str {
        match self {
            KeySuggestion::Item { insert_text, .. } => insert_text,
            KeySuggestion::Key(value) => &value.value,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            KeySuggestion::Item { item, .. } => item.description(),
            KeySuggestion::Key(value) => value.one_line_description.as_deref(),
        }
    }
}

/// True when `parent` is a prefix of `name`, letting wildcard segments of
/// `name` stand for any key.
fn lies_under(parent: &CanonicalName, name: &CanonicalName) -> bool {
    parent.len() < name.len()
        && (0..parent.len()).all(|i| name.is_wildcard(i) || parent.uniform(i) == name.uniform(i))
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Keys to offer for `query` typed below `parent`.
///
/// Properties deprecated at error level are never offered. When nothing is
/// declared below `parent` and `parent` is a map property, its key hints are
/// offered instead.
pub fn suggest_keys(
    index: &dyn MetadataIndex,
    types: &dyn TypeOracle,
    parent: &CanonicalName,
    query: &str,
) -> Vec<KeySuggestion> {
    let suggestions: Vec<KeySuggestion> = CompletionSearch::new(index)
        .find_candidates(parent, query)
        .into_iter()
        .filter(|item| match item {
            MetadataItem::Property(p) => p.deprecation_level() != DeprecationLevel::Error,
            MetadataItem::Group(_) => true,
            MetadataItem::Hint(_) => false,
        })
        .map(|item| {
            debug_assert!(lies_under(parent, item.name()), "{item} is not below {parent}");
            let insert_text = item.name().sub_name(parent.len()).to_string();
            KeySuggestion::Item { item, insert_text }
        })
        .collect();
    if !suggestions.is_empty() {
        return suggestions;
    }

    let Some(property) = index.property(parent) else {
        return Vec::new();
    };
    let view = PropertyView::new(&property, index, types);
    if !view.is_map_type() {
        return Vec::new();
    }
    view.key_hint_values()
        .into_iter()
        .filter(|v| starts_with_ignore_case(&v.value, query.trim()))
        .map(KeySuggestion::Key)
        .collect()
}

/// Values to offer for the key `name`, filtered by a case-insensitive prefix.
///
/// Falls back from the property itself to a map-typed parent, then to the
/// nearest value-map ancestor.
pub fn suggest_values(
    index: &dyn MetadataIndex,
    types: &dyn TypeOracle,
    name: &CanonicalName,
    query: &str,
) -> Vec<HintValue> {
    let query = query.trim();
    let filter = |values: Vec<HintValue>| -> Vec<HintValue> {
        values
            .into_iter()
            .filter(|v| starts_with_ignore_case(&v.value, query))
            .collect()
    };

    if let Some(property) = index.property(name) {
        return filter(PropertyView::new(&property, index, types).hint_values());
    }
    let Some(parent) = name.parent() else {
        return Vec::new();
    };
    if let Some(property) = index.property(&parent) {
        let view = PropertyView::new(&property, index, types);
        if view.is_map_type() {
            return filter(view.hint_values());
        }
    }
    if let Some(property) = index.nearest_parent_property(&parent) {
        let view = PropertyView::new(&property, index, types);
        if view.is_value_map() {
            return filter(view.hint_values());
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SourceIndex;
    use keyscope_api::{ConfigurationMetadata, ProjectId, TypeShape};

    struct MapOracle;

    impl TypeOracle for MapOracle {
        fn shape(&self, type_name: &str) -> TypeShape {
            if type_name.starts_with("Map") {
                TypeShape::Map {
                    key: "String".into(),
                    value: "String".into(),
                }
            } else {
                TypeShape::Scalar
            }
        }

        fn is_value_map(&self, type_name: &str) -> bool {
            type_name == "MapOfValues"
        }
    }

    fn index() -> SourceIndex {
        let metadata: ConfigurationMetadata = serde_json::from_str(
            r#"{
                "groups": [{"name": "server"}],
                "properties": [
                    {"name": "server.port", "description": "Server HTTP port."},
                    {"name": "server.legacy", "deprecation": {"level": "error"}},
                    {"name": "server.old", "deprecated": true},
                    {"name": "server.mode", "type": "String"},
                    {"name": "app.labels", "type": "Map"},
                    {"name": "logging.level", "type": "MapOfValues"}
                ],
                "hints": [
                    {"name": "server.mode", "values": [{"value": "fast"}, {"value": "safe"}, {"value": "Fancy"}]},
                    {"name": "app.labels.keys", "values": [{"value": "team"}, {"value": "tier"}, {"value": "owner"}]},
                    {"name": "app.labels.values", "values": [{"value": "gold"}]},
                    {"name": "logging.level.values", "values": [{"value": "info"}, {"value": "debug"}]}
                ]
            }"#,
        )
        .unwrap();
        SourceIndex::build(ProjectId::new("demo"), "test", &metadata)
    }

    fn texts(suggestions: &[KeySuggestion]) -> Vec<&str> {
        suggestions.iter().map(KeySuggestion::insert_text).collect()
    }

    #[test]
    fn test_keys_are_relative_to_parent() {
        let idx = index();
        let found = suggest_keys(&idx, &MapOracle, &CanonicalName::adapt("server"), "");
        assert_eq!(texts(&found), vec!["mode", "old", "port"]);
        let port = found.iter().find(|s| s.insert_text() == "port").unwrap();
        assert_eq!(port.description(), Some("Server HTTP port."));
    }

    #[test]
    fn test_error_deprecated_keys_are_hidden() {
        let idx = index();
        let found = suggest_keys(&idx, &MapOracle, &CanonicalName::adapt("server"), "leg");
        assert!(found.is_empty());
    }

    #[test]
    fn test_map_key_hints_are_the_fallback() {
        let idx = index();
        let found = suggest_keys(&idx, &MapOracle, &CanonicalName::adapt("app.labels"), "T");
        assert_eq!(texts(&found), vec!["team", "tier"]);
        assert!(matches!(found[0], KeySuggestion::Key(_)));
    }

    #[test]
    fn test_values_for_declared_property() {
        let idx = index();
        let mode = CanonicalName::adapt("server.mode");
        let values: Vec<_> = suggest_values(&idx, &MapOracle, &mode, "f")
            .into_iter()
            .map(|v| v.value)
            .collect();
        assert_eq!(values, vec!["fast", "Fancy"]);
    }

    #[test]
    fn test_values_from_map_parent() {
        let idx = index();
        let values = suggest_values(&idx, &MapOracle, &CanonicalName::adapt("app.labels.team"), "");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "gold");
    }

    #[test]
    fn test_values_from_value_map_ancestor() {
        let idx = index();
        let values: Vec<_> = suggest_values(
            &idx,
            &MapOracle,
            &CanonicalName::adapt("logging.level.org.springframework"),
            "",
        )
        .into_iter()
        .map(|v| v.value)
        .collect();
        assert_eq!(values, vec!["info", "debug"]);
    }

    #[test]
    fn test_values_for_unknown_key() {
        let idx = index();
        let nothing = CanonicalName::adapt("nothing.here");
        assert!(suggest_values(&idx, &MapOracle, &nothing, "").is_empty());
        assert!(suggest_values(&idx, &MapOracle, &CanonicalName::empty(), "").is_empty());
    }

    #[test]
    fn test_typed_map_key_is_not_replaced_by_placeholder() {
        let metadata: ConfigurationMetadata = serde_json::from_str(
            r#"{"properties": [
                {"name": "cache.regions", "type": "Map"},
                {"name": "cache.regions.*.ttl", "type": "java.time.Duration"}
            ]}"#,
        )
        .unwrap();
        let idx = SourceIndex::build(ProjectId::new("demo"), "test", &metadata);

        let cache = CanonicalName::adapt("cache");
        let through_key = suggest_keys(&idx, &MapOracle, &cache, "regions.myRegion.t");
        assert!(texts(&through_key).iter().all(|t| !t.contains('*')));
        assert!(through_key.is_empty());

        // completing below the concrete key keeps the user's spelling in the parent
        let region = CanonicalName::adapt("cache.regions.myRegion");
        let below_key = suggest_keys(&idx, &MapOracle, &region, "t");
        assert_eq!(texts(&below_key), vec!["ttl"]);
    }
}
