//! Candidate search over the merged name trie.

use crate::index::{MetadataIndex, TrieNode};
use keyscope_api::{CanonicalName, MetadataItem};
use rayon::prelude::*;
use std::collections::HashSet;

/// Finds the records to offer below an ancestor name for a partially typed
/// relative query.
pub struct CompletionSearch<'a> {
    index: &'a dyn MetadataIndex,
}

impl<'a> CompletionSearch<'a> {
    pub fn new(index: &'a dyn MetadataIndex) -> Self {
        Self { index }
    }

    /// Candidates for `query` typed below `ancestor`.
    ///
    /// The last query segment is a case-insensitive prefix, earlier segments
    /// must match exactly. A blank query lists what sits directly below the
    /// ancestor. A query ending in `.` lists what sits below its last segment.
    ///
    /// From each matched node, records are collected breadth-first: a node
    /// with records of its own contributes them and is not descended into,
    /// an empty structural node is expanded, and an indexed node (an open map
    /// key or list index) is never expanded. The result is deduplicated and
    /// sorted by name.
    pub fn find_candidates(&self, ancestor: &CanonicalName, query: &str) -> Vec<MetadataItem> {
        let Some(root) = self.index.find_in_name_trie(ancestor) else {
            return Vec::new();
        };
        if root.is_indexed() {
            return Vec::new();
        }

        let query = query.trim();
        let frontier = if query.is_empty() {
            vec![(root, true)]
        } else {
            narrow(root, query)
        };

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut level = frontier;
        while !level.is_empty() {
            let visited: Vec<(Vec<MetadataItem>, Vec<TrieNode>)> =
                level.par_iter().map(|(node, is_root)| visit(node, *is_root)).collect();

            let mut next = Vec::new();
            for (data, children) in visited {
                for item in data {
                    if seen.insert(item.clone()) {
                        result.push(item);
                    }
                }
                next.extend(children.into_iter().map(|child| (child, false)));
            }
            level = next;
        }

        result.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.kind().cmp(b.kind())));
        result
    }
}

/// Records contributed by `node` and the children to visit next.
fn visit(node: &TrieNode, is_root: bool) -> (Vec<MetadataItem>, Vec<TrieNode>) {
    if is_root {
        return (Vec::new(), node.children().into_values().collect());
    }
    let data = node.data();
    if !data.is_empty() || node.is_indexed() {
        return (data, Vec::new());
    }
    (data, node.children().into_values().collect())
}

/// Walks the query segments from `root`, keeping every node that matches.
///
/// Typed segments only match declared segments; an open map key in the query
/// is not bound to the `*` position, since the insert text could not carry it.
fn narrow(root: TrieNode, query: &str) -> Vec<(TrieNode, bool)> {
    let name = CanonicalName::adapt(query);
    let open_tail = query.ends_with('.');
    let segments: Vec<&str> = name.segments().collect();

    let mut frontier = vec![root];
    for (i, segment) in segments.iter().enumerate() {
        let partial = i + 1 == segments.len() && !open_tail;
        frontier = frontier
            .par_iter()
            .filter(|node| !node.is_indexed())
            .flat_map_iter(|node| {
                if partial {
                    node.prefix_map(segment).into_values().collect::<Vec<_>>()
                } else {
                    node.literal_child(segment).into_iter().collect()
                }
            })
            .collect();
        if frontier.is_empty() {
            return Vec::new();
        }
    }

    if open_tail {
        frontier
            .into_iter()
            .filter(|node| !node.is_indexed())
            .map(|node| (node, true))
            .collect()
    } else {
        frontier.into_iter().map(|node| (node, false)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{AggregatedIndex, SourceIndex};
    use keyscope_api::{ConfigurationMetadata, ProjectId};
    use std::sync::Arc;

    fn index(json: &str) -> SourceIndex {
        let metadata: ConfigurationMetadata = serde_json::from_str(json).unwrap();
        SourceIndex::build(ProjectId::new("demo"), "test", &metadata)
    }

    fn names(items: &[MetadataItem]) -> Vec<String> {
        items.iter().map(|i| i.name().to_string()).collect()
    }

    const SERVER: &str = r#"{
        "groups": [
            {"name": "server", "type": "a.ServerProperties"},
            {"name": "server.ssl", "type": "a.Ssl"}
        ],
        "properties": [
            {"name": "server.port", "type": "java.lang.Integer"},
            {"name": "server.address", "type": "java.net.InetAddress"},
            {"name": "server.ssl.enabled", "type": "java.lang.Boolean"}
        ]
    }"#;

    #[test]
    fn test_prefix_query_below_ancestor() {
        let idx = index(SERVER);
        let search = CompletionSearch::new(&idx);
        let found = search.find_candidates(&CanonicalName::adapt("server"), "po");
        assert_eq!(names(&found), vec!["server.port"]);
    }

    #[test]
    fn test_blank_query_lists_one_level() {
        let idx = index(SERVER);
        let search = CompletionSearch::new(&idx);
        let found = search.find_candidates(&CanonicalName::adapt("server"), "");
        assert_eq!(
            names(&found),
            vec!["server.address", "server.port", "server.ssl"]
        );
        assert!(!names(&found).contains(&"server".to_string()));
    }

    #[test]
    fn test_structural_nodes_are_expanded() {
        // "spring" and "spring.main" are not declared, so the search walks through them
        let idx = index(
            r#"{"properties": [
                {"name": "spring.main.banner-mode"},
                {"name": "spring.main.lazy-initialization"}
            ]}"#,
        );
        let search = CompletionSearch::new(&idx);
        let found = search.find_candidates(&CanonicalName::empty(), "spr");
        assert_eq!(
            names(&found),
            vec!["spring.main.banner-mode", "spring.main.lazy-initialization"]
        );
    }

    #[test]
    fn test_exact_segments_then_prefix() {
        let idx = index(SERVER);
        let search = CompletionSearch::new(&idx);
        let found = search.find_candidates(&CanonicalName::empty(), "server.ssl.EN");
        assert_eq!(names(&found), vec!["server.ssl.enabled"]);

        assert!(search.find_candidates(&CanonicalName::empty(), "serv.ssl").is_empty());
    }

    #[test]
    fn test_trailing_dot_lists_children() {
        let idx = index(SERVER);
        let search = CompletionSearch::new(&idx);
        let found = search.find_candidates(&CanonicalName::empty(), "server.ssl.");
        assert_eq!(names(&found), vec!["server.ssl.enabled"]);
    }

    #[test]
    fn test_unknown_ancestor_is_empty() {
        let idx = index(SERVER);
        let search = CompletionSearch::new(&idx);
        assert!(search
            .find_candidates(&CanonicalName::adapt("nope"), "")
            .is_empty());
    }

    const REGIONS: &str = r#"{"properties": [
        {"name": "cache.regions", "type": "java.util.Map<java.lang.String,a.Region>"},
        {"name": "cache.regions.*.ttl", "type": "java.time.Duration"},
        {"name": "cache.regions.*.max-size", "type": "java.lang.Long"}
    ]}"#;

    #[test]
    fn test_indexed_ancestor_yields_nothing() {
        let idx = index(REGIONS);
        let search = CompletionSearch::new(&idx);
        assert!(search
            .find_candidates(&CanonicalName::adapt("cache.regions.*"), "")
            .is_empty());
    }

    #[test]
    fn test_concrete_map_key_reaches_element_structure() {
        let idx = index(REGIONS);
        let search = CompletionSearch::new(&idx);
        let found = search.find_candidates(&CanonicalName::adapt("cache.regions.myRegion"), "t");
        assert_eq!(names(&found), vec!["cache.regions[*].ttl"]);
    }

    #[test]
    fn test_query_does_not_bind_open_map_keys() {
        let idx = index(REGIONS);
        let search = CompletionSearch::new(&idx);
        let cache = CanonicalName::adapt("cache");
        assert!(search.find_candidates(&cache, "regions.myRegion.t").is_empty());
        assert!(search.find_candidates(&cache, "regions.myRegion.").is_empty());
        assert_eq!(names(&search.find_candidates(&cache, "reg")), vec!["cache.regions"]);
    }

    #[test]
    fn test_indexed_nodes_are_not_expanded() {
        let idx = index(r#"{"properties": [{"name": "cache.regions.*.ttl"}]}"#);
        let search = CompletionSearch::new(&idx);
        assert!(search
            .find_candidates(&CanonicalName::adapt("cache"), "")
            .is_empty());
    }

    #[test]
    fn test_results_merge_across_sources_without_duplicates() {
        let a: Arc<dyn MetadataIndex> = Arc::new(index(SERVER));
        let b: Arc<dyn MetadataIndex> = Arc::new(index(
            r#"{"properties": [
                {"name": "server.port", "type": "java.lang.Integer"},
                {"name": "server.shutdown", "type": "a.Shutdown"}
            ]}"#,
        ));
        let mut agg = AggregatedIndex::new();
        agg.add_last(a);
        agg.add_last(b);

        let search = CompletionSearch::new(&agg);
        let found = search.find_candidates(&CanonicalName::adapt("server"), "");
        assert_eq!(
            names(&found),
            vec!["server.address", "server.port", "server.shutdown", "server.ssl"]
        );
    }
}
