use super::property::PropertyView;
use crate::index::MetadataIndex;
use keyscope_api::{CanonicalName, MetadataItem, Property, TypeOracle};
use std::sync::Arc;

/// Classification of a fully qualified key written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStatus {
    /// A property is declared under this name, directly or through a
    /// wildcard position.
    Defined(Arc<Property>),
    /// An ancestor property accepts arbitrary keys below it.
    BoundByAncestor(Arc<Property>),
    Unknown,
}

impl KeyStatus {
    pub fn is_known(&self) -> bool {
        !matches!(self, KeyStatus::Unknown)
    }
}

pub fn check_key(
    index: &dyn MetadataIndex,
    types: &dyn TypeOracle,
    key: &CanonicalName,
) -> KeyStatus {
    if key.is_empty() {
        return KeyStatus::Unknown;
    }
    if let Some(property) = index.property(key) {
        return KeyStatus::Defined(property);
    }
    if let Some(property) = index.find_in_name_trie(key).and_then(|node| {
        node.data()
            .into_iter()
            .find_map(|item| item.as_property().cloned())
    }) {
        return KeyStatus::Defined(property);
    }
    match index.nearest_parent_property(key) {
        Some(parent) if PropertyView::new(&parent, index, types).can_bind(key) => {
            KeyStatus::BoundByAncestor(parent)
        }
        _ => KeyStatus::Unknown,
    }
}

/// Declared properties whose name shares the longest prefix with `key`.
pub fn closest_properties(
    index: &dyn MetadataIndex,
    key: &CanonicalName,
    limit: usize,
) -> Vec<MetadataItem> {
    let shared = |name: &CanonicalName| {
        name.segments()
            .zip(key.segments())
            .take_while(|(a, b)| a == b)
            .count()
    };
    let mut scored: Vec<(usize, Arc<Property>)> = index
        .properties()
        .into_values()
        .map(|p| (shared(&p.name), p))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.name.cmp(&b.name)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, p)| MetadataItem::Property(p))
        .collect()
}
