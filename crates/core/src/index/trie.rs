//! Segment trie over canonical names.
//!
//! A [`NameTrie`] is built once per source and then frozen behind an `Arc`.
//! Lookups go through [`TrieNode`], a cheap view that may span several tries
//! at the same name position; merging two views only concatenates their
//! parts, so the union of any number of sources never mutates shared state.

use keyscope_api::{CanonicalName, INDEX_PLACEHOLDER, MetadataItem};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

type SlotId = usize;

const ROOT: SlotId = 0;

#[derive(Debug, Default)]
struct Slot {
    children: HashMap<Box<str>, SlotId>,
    data: Vec<MetadataItem>,
    indexed: bool,
}

/// Arena-backed trie keyed by uniform segments.
#[derive(Debug)]
pub struct NameTrie {
    slots: Vec<Slot>,
}

impl Default for NameTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTrie {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::default()],
        }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() == 1 && self.slots[ROOT].data.is_empty()
    }

    /// Attaches `item` at the position of `name`, creating the path as needed.
    /// Wildcard segments mark their node as indexed. Duplicate items are ignored.
    pub fn insert(&mut self, name: &CanonicalName, item: MetadataItem) {
        let mut slot = ROOT;
        for i in 0..name.len() {
            slot = self.child_or_insert(slot, name.uniform(i), name.is_wildcard(i));
        }
        let data = &mut self.slots[slot].data;
        if !data.contains(&item) {
            data.push(item);
        }
    }

    fn child_or_insert(&mut self, parent: SlotId, key: &str, wildcard: bool) -> SlotId {
        if let Some(&existing) = self.slots[parent].children.get(key) {
            return existing;
        }
        let id = self.slots.len();
        self.slots.push(Slot {
            indexed: wildcard,
            ..Slot::default()
        });
        self.slots[parent].children.insert(key.into(), id);
        id
    }
}

#[derive(Debug, Clone)]
struct Part {
    trie: Arc<NameTrie>,
    slot: SlotId,
    /// Reached through a wildcard by a concrete key.
    bound: bool,
}

impl Part {
    fn slot(&self) -> &Slot {
        &self.trie.slots[self.slot]
    }

    fn same_position(&self, other: &Part) -> bool {
        Arc::ptr_eq(&self.trie, &other.trie) && self.slot == other.slot
    }
}

/// Read-only view of one name position across one or more tries.
#[derive(Debug, Clone)]
pub struct TrieNode {
    parts: Vec<Part>,
}

impl TrieNode {
    pub fn root(trie: Arc<NameTrie>) -> Self {
        Self {
            parts: vec![Part {
                trie,
                slot: ROOT,
                bound: false,
            }],
        }
    }

    /// True when this position stands for "any key or index" and was not
    /// reached by naming a concrete key.
    pub fn is_indexed(&self) -> bool {
        self.parts.iter().any(|p| p.slot().indexed && !p.bound)
    }

    /// Union of the data of every part, first occurrence wins the order.
    pub fn data(&self) -> Vec<MetadataItem> {
        let mut seen = HashSet::new();
        self.parts
            .iter()
            .flat_map(|p| p.slot().data.iter())
            .filter(|item| seen.insert(*item))
            .cloned()
            .collect()
    }

    pub fn has_data(&self) -> bool {
        self.parts.iter().any(|p| !p.slot().data.is_empty())
    }

    /// Child for one uniform segment.
    ///
    /// A concrete key also matches the `*` child of every part, yielding a
    /// bound (non-indexed) view so lookups can continue below a map entry.
    pub fn child(&self, segment: &str) -> Option<TrieNode> {
        self.child_matching(segment, segment != INDEX_PLACEHOLDER)
    }

    /// Child for one uniform segment, matched literally. A concrete key never
    /// falls through to the `*` child.
    pub fn literal_child(&self, segment: &str) -> Option<TrieNode> {
        self.child_matching(segment, false)
    }

    fn child_matching(&self, segment: &str, bind_placeholder: bool) -> Option<TrieNode> {
        let mut parts = Vec::new();
        for part in &self.parts {
            let children = &part.slot().children;
            if let Some(&slot) = children.get(segment) {
                parts.push(Part {
                    trie: Arc::clone(&part.trie),
                    slot,
                    bound: false,
                });
            }
            if bind_placeholder && let Some(&slot) = children.get(INDEX_PLACEHOLDER) {
                parts.push(Part {
                    trie: Arc::clone(&part.trie),
                    slot,
                    bound: true,
                });
            }
        }
        (!parts.is_empty()).then_some(TrieNode { parts })
    }

    /// All children, key-wise merged across parts.
    pub fn children(&self) -> BTreeMap<String, TrieNode> {
        self.collect_children(|_| true)
    }

    /// Children whose key starts with `prefix`, compared case-insensitively.
    pub fn prefix_map(&self, prefix: &str) -> BTreeMap<String, TrieNode> {
        let prefix = prefix.to_lowercase();
        self.collect_children(|key| key.to_lowercase().starts_with(&prefix))
    }

    fn collect_children(&self, accept: impl Fn(&str) -> bool) -> BTreeMap<String, TrieNode> {
        let mut out: BTreeMap<String, TrieNode> = BTreeMap::new();
        for part in &self.parts {
            for (key, &slot) in &part.slot().children {
                if !accept(key) {
                    continue;
                }
                let child = Part {
                    trie: Arc::clone(&part.trie),
                    slot,
                    bound: false,
                };
                out.entry(key.to_string())
                    .and_modify(|node| node.push(child.clone()))
                    .or_insert_with(|| TrieNode { parts: vec![child] });
            }
        }
        out
    }

    /// Walks `name` segment by segment from this node.
    pub fn find(&self, name: &CanonicalName) -> Option<TrieNode> {
        let mut node = self.clone();
        for segment in name.segments() {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Ephemeral union of two views. Associative and commutative up to
    /// ordering; neither input is modified.
    pub fn merge(mut self, other: TrieNode) -> TrieNode {
        for part in other.parts {
            self.push(part);
        }
        self
    }

    fn push(&mut self, part: Part) {
        if !self
            .parts
            .iter()
            .any(|p| p.same_position(&part) && p.bound == part.bound)
        {
            self.parts.push(part);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyscope_api::Property;

    fn property(name: &str) -> MetadataItem {
        MetadataItem::Property(Arc::new(Property {
            name: CanonicalName::adapt(name),
            type_name: None,
            source_type: None,
            description: None,
            default_value: None,
            deprecation: None,
        }))
    }

    fn trie(names: &[&str]) -> Arc<NameTrie> {
        let mut trie = NameTrie::new();
        for name in names {
            trie.insert(&CanonicalName::adapt(name), property(name));
        }
        Arc::new(trie)
    }

    #[test]
    fn test_insert_and_find() {
        let root = TrieNode::root(trie(&["server.port", "server.address"]));
        let port = root.find(&CanonicalName::adapt("server.port")).unwrap();
        assert_eq!(port.data(), vec![property("server.port")]);

        let server = root.find(&CanonicalName::adapt("SERVER")).unwrap();
        assert!(server.data().is_empty());
        assert_eq!(server.children().len(), 2);
        assert!(root.find(&CanonicalName::adapt("server.missing")).is_none());
    }

    #[test]
    fn test_duplicate_insert_is_ignored() {
        let mut t = NameTrie::new();
        let name = CanonicalName::adapt("a.b");
        t.insert(&name, property("a.b"));
        t.insert(&name, property("a.b"));
        let node = TrieNode::root(Arc::new(t)).find(&name).unwrap();
        assert_eq!(node.data().len(), 1);
    }

    #[test]
    fn test_prefix_map_is_case_insensitive() {
        let root = TrieNode::root(trie(&["server.port", "server.ssl.enabled", "spring.main"]));
        let server = root.child("server").unwrap();
        let keys: Vec<_> = server.prefix_map("SS").into_keys().collect();
        assert_eq!(keys, vec!["ssl"]);
        assert_eq!(root.prefix_map("s").len(), 2);
        assert_eq!(root.prefix_map("").len(), 2);
    }

    #[test]
    fn test_wildcard_binding() {
        let root = TrieNode::root(trie(&["cache.regions.*.ttl"]));
        let regions = root.find(&CanonicalName::adapt("cache.regions")).unwrap();

        let placeholder = regions.child("*").unwrap();
        assert!(placeholder.is_indexed());

        let bound = regions.child("myregion").unwrap();
        assert!(!bound.is_indexed());
        assert!(bound.child("ttl").is_some());

        let via_name = root
            .find(&CanonicalName::adapt("cache.regions.myRegion.ttl"))
            .unwrap();
        assert_eq!(via_name.data(), vec![property("cache.regions.*.ttl")]);

        // "*" only matches literally, never as a text prefix
        assert!(regions.prefix_map("m").is_empty());
        assert_eq!(regions.prefix_map("").len(), 1);
    }

    #[test]
    fn test_literal_child_does_not_bind_placeholder() {
        let root = TrieNode::root(trie(&["cache.regions.*.ttl"]));
        let regions = root.find(&CanonicalName::adapt("cache.regions")).unwrap();
        assert!(regions.literal_child("myregion").is_none());
        assert!(regions.literal_child("*").unwrap().is_indexed());
    }

    #[test]
    fn test_merge_unions_data_and_children() {
        let a = TrieNode::root(trie(&["server.port", "server.ssl.enabled"]));
        let b = TrieNode::root(trie(&["server.port", "server.address"]));
        let merged = a.clone().merge(b.clone());

        let server = merged.child("server").unwrap();
        let keys: Vec<_> = server.children().into_keys().collect();
        assert_eq!(keys, vec!["address", "port", "ssl"]);

        // identical records from two sources count once
        let port = server.child("port").unwrap();
        assert_eq!(port.data().len(), 1);

        // commutative up to ordering
        let reversed = b.merge(a);
        let server = CanonicalName::adapt("server");
        let mut left: Vec<_> = merged.find(&server).unwrap().children().into_keys().collect();
        let mut right: Vec<_> = reversed.find(&server).unwrap().children().into_keys().collect();
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }

    #[test]
    fn test_merge_keeps_inputs_intact() {
        let a = TrieNode::root(trie(&["x.y"]));
        let b = TrieNode::root(trie(&["x.z"]));
        let _ = a.clone().merge(b.clone());
        assert_eq!(a.child("x").unwrap().children().len(), 1);
        assert_eq!(b.child("x").unwrap().children().len(), 1);
    }

    #[test]
    fn test_indexed_flag_survives_merge() {
        let m = CanonicalName::adapt("m");
        let a = TrieNode::root(trie(&["m.*.v"])).find(&m).unwrap();
        let b = TrieNode::root(trie(&["m.k"])).find(&m).unwrap();
        let merged = a.merge(b);
        assert!(merged.child("*").unwrap().is_indexed());
        assert!(!merged.child("k").unwrap().is_indexed());
    }
}
