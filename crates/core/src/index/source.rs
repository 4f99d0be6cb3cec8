use super::{MetadataIndex, NameTrie, TrieNode, nearest_in};
use keyscope_api::{
    CanonicalName, ConfigurationMetadata, Group, Hint, MetadataItem, ProjectId, Property,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Immutable index over the records of one metadata document.
#[derive(Debug)]
pub struct SourceIndex {
    project: ProjectId,
    source: String,
    groups: HashMap<CanonicalName, Arc<Group>>,
    properties: HashMap<CanonicalName, Arc<Property>>,
    hints: HashMap<CanonicalName, Arc<Hint>>,
    trie: Arc<NameTrie>,
}

impl SourceIndex {
    /// Index with no records. It still reports its project.
    pub fn empty(project: ProjectId, source: impl Into<String>) -> Self {
        Self {
            project,
            source: source.into(),
            groups: HashMap::new(),
            properties: HashMap::new(),
            hints: HashMap::new(),
            trie: Arc::new(NameTrie::new()),
        }
    }

    /// Builds the index. When a name is declared twice in the same document
    /// the first declaration is kept.
    pub fn build(
        project: ProjectId,
        source: impl Into<String>,
        metadata: &ConfigurationMetadata,
    ) -> Self {
        let mut index = Self::empty(project, source);
        let mut trie = NameTrie::new();

        for raw in &metadata.groups {
            let group = Arc::new(Group::from(raw));
            if let Entry::Vacant(slot) = index.groups.entry(group.name.clone()) {
                trie.insert(&group.name, MetadataItem::Group(Arc::clone(&group)));
                slot.insert(group);
            }
        }
        for raw in &metadata.properties {
            let property = Arc::new(Property::from(raw));
            if let Entry::Vacant(slot) = index.properties.entry(property.name.clone()) {
                trie.insert(&property.name, MetadataItem::Property(Arc::clone(&property)));
                slot.insert(property);
            }
        }
        for raw in &metadata.hints {
            let hint = Arc::new(Hint::from(raw));
            index.hints.entry(hint.name.clone()).or_insert(hint);
        }

        index.trie = Arc::new(trie);
        index
    }

    pub fn len(&self) -> usize {
        self.groups.len() + self.properties.len() + self.hints.len()
    }
}

impl MetadataIndex for SourceIndex {
    fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.properties.is_empty() && self.hints.is_empty()
    }

    fn project(&self) -> Option<ProjectId> {
        Some(self.project.clone())
    }

    fn source(&self) -> String {
        self.source.clone()
    }

    fn groups(&self) -> HashMap<CanonicalName, Arc<Group>> {
        self.groups.clone()
    }

    fn properties(&self) -> HashMap<CanonicalName, Arc<Property>> {
        self.properties.clone()
    }

    fn hints(&self) -> HashMap<CanonicalName, Arc<Hint>> {
        self.hints.clone()
    }

    fn group(&self, name: &CanonicalName) -> Option<Arc<Group>> {
        self.groups.get(name).cloned()
    }

    fn property(&self, name: &CanonicalName) -> Option<Arc<Property>> {
        self.properties.get(name).cloned()
    }

    fn nearest_parent_property(&self, name: &CanonicalName) -> Option<Arc<Property>> {
        nearest_in(&self.properties, name)
    }

    fn hint(&self, name: &CanonicalName) -> Option<Arc<Hint>> {
        self.hints.get(name).cloned()
    }

    fn find_in_name_trie(&self, name: &CanonicalName) -> Option<TrieNode> {
        TrieNode::root(Arc::clone(&self.trie)).find(name)
    }
}
