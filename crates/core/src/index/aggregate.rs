use super::{MetadataIndex, TrieNode};
use keyscope_api::{CanonicalName, Group, Hint, ProjectId, Property};
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::sync::Arc;

/// Late-bound handle to an index. Resolved on every use, so the target may
/// change (or disappear) between calls.
pub trait IndexRef: Send + Sync + Debug {
    fn resolve(&self) -> Option<Arc<dyn MetadataIndex>>;
}

/// Reference to an index that never changes.
#[derive(Debug, Clone)]
pub struct FixedRef(pub Arc<dyn MetadataIndex>);

impl IndexRef for FixedRef {
    fn resolve(&self) -> Option<Arc<dyn MetadataIndex>> {
        Some(Arc::clone(&self.0))
    }
}

/// Ordered, precedence-respecting union of several indexes.
///
/// Earlier members win scalar lookups and key collisions in bulk lookups.
/// Members are assembled with `&mut self` and the aggregate is then shared
/// immutably.
#[derive(Debug, Default)]
pub struct AggregatedIndex {
    members: VecDeque<Arc<dyn IndexRef>>,
}

impl AggregatedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `index` with the highest precedence.
    pub fn add_first(&mut self, index: Arc<dyn MetadataIndex>) {
        self.add_first_ref(Arc::new(FixedRef(index)));
    }

    /// Inserts `index` with the lowest precedence.
    pub fn add_last(&mut self, index: Arc<dyn MetadataIndex>) {
        self.add_last_ref(Arc::new(FixedRef(index)));
    }

    pub fn add_first_ref(&mut self, member: Arc<dyn IndexRef>) {
        self.members.push_front(member);
    }

    pub fn add_last_ref(&mut self, member: Arc<dyn IndexRef>) {
        self.members.push_back(member);
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Resolves every member once, in precedence order, skipping absent ones.
    pub fn snapshot(&self) -> Vec<Arc<dyn MetadataIndex>> {
        self.members.iter().filter_map(|m| m.resolve()).collect()
    }

    fn first<T>(&self, f: impl Fn(&dyn MetadataIndex) -> Option<T>) -> Option<T> {
        self.members
            .iter()
            .filter_map(|m| m.resolve())
            .find_map(|index| f(index.as_ref()))
    }

    fn union<T: Clone>(
        &self,
        f: impl Fn(&dyn MetadataIndex) -> HashMap<CanonicalName, T>,
    ) -> HashMap<CanonicalName, T> {
        let mut out = HashMap::new();
        for index in self.snapshot() {
            for (name, value) in f(index.as_ref()) {
                out.entry(name).or_insert(value);
            }
        }
        out
    }
}

impl MetadataIndex for AggregatedIndex {
    fn is_empty(&self) -> bool {
        self.snapshot().iter().all(|index| index.is_empty())
    }

    /// # Panics
    /// Panics when members report different projects; mixing projects in one
    /// aggregate is a construction bug.
    fn project(&self) -> Option<ProjectId> {
        self.snapshot()
            .iter()
            .filter_map(|index| index.project())
            .reduce(|a, b| {
                assert_eq!(a, b, "aggregated indexes must belong to one project");
                a
            })
    }

    fn source(&self) -> String {
        let parts: Vec<String> = self.snapshot().iter().map(|index| index.source()).collect();
        format!("Aggregated{{{}}}", parts.join(","))
    }

    fn groups(&self) -> HashMap<CanonicalName, Arc<Group>> {
        self.union(|index| index.groups())
    }

    fn properties(&self) -> HashMap<CanonicalName, Arc<Property>> {
        self.union(|index| index.properties())
    }

    fn hints(&self) -> HashMap<CanonicalName, Arc<Hint>> {
        self.union(|index| index.hints())
    }

    fn group(&self, name: &CanonicalName) -> Option<Arc<Group>> {
        self.first(|index| index.group(name))
    }

    fn property(&self, name: &CanonicalName) -> Option<Arc<Property>> {
        self.first(|index| index.property(name))
    }

    fn nearest_parent_property(&self, name: &CanonicalName) -> Option<Arc<Property>> {
        self.first(|index| index.nearest_parent_property(name))
    }

    fn hint(&self, name: &CanonicalName) -> Option<Arc<Hint>> {
        self.first(|index| index.hint(name))
    }

    fn find_in_name_trie(&self, name: &CanonicalName) -> Option<TrieNode> {
        self.snapshot()
            .iter()
            .filter_map(|index| index.find_in_name_trie(name))
            .reduce(TrieNode::merge)
    }
}
