//! Queryable metadata indexes.

pub mod aggregate;
pub mod source;
pub mod trie;

pub use aggregate::{AggregatedIndex, FixedRef, IndexRef};
pub use source::SourceIndex;
pub use trie::{NameTrie, TrieNode};

use keyscope_api::{CanonicalName, Group, Hint, MetadataItem, ProjectId, Property};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Read side of a metadata index, implemented by single-source and
/// aggregated indexes alike.
pub trait MetadataIndex: Send + Sync + Debug {
    fn is_empty(&self) -> bool;

    /// Project this index belongs to, `None` when nothing is resolvable.
    fn project(&self) -> Option<ProjectId>;

    /// Human-readable description of where the data comes from.
    fn source(&self) -> String;

    fn groups(&self) -> HashMap<CanonicalName, Arc<Group>>;

    fn properties(&self) -> HashMap<CanonicalName, Arc<Property>>;

    fn hints(&self) -> HashMap<CanonicalName, Arc<Hint>>;

    fn group(&self, name: &CanonicalName) -> Option<Arc<Group>>;

    fn property(&self, name: &CanonicalName) -> Option<Arc<Property>>;

    /// Closest strict ancestor of `name` that is declared as a property.
    fn nearest_parent_property(&self, name: &CanonicalName) -> Option<Arc<Property>>;

    fn hint(&self, name: &CanonicalName) -> Option<Arc<Hint>>;

    fn property_or_group(&self, name: &CanonicalName) -> Option<MetadataItem> {
        self.property(name)
            .map(MetadataItem::Property)
            .or_else(|| self.group(name).map(MetadataItem::Group))
    }

    /// Any record named exactly `name`: property, then group, then hint.
    fn lookup(&self, name: &CanonicalName) -> Option<MetadataItem> {
        self.property_or_group(name)
            .or_else(|| self.hint(name).map(MetadataItem::Hint))
    }

    fn find_in_name_trie(&self, name: &CanonicalName) -> Option<TrieNode>;
}

/// Nearest-ancestor walk shared by indexes that own a property map.
pub(crate) fn nearest_in(
    properties: &HashMap<CanonicalName, Arc<Property>>,
    name: &CanonicalName,
) -> Option<Arc<Property>> {
    name.ancestors().find_map(|parent| properties.get(&parent).cloned())
}
