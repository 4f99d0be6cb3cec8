//! Metadata as seen by one consumer (a module of the workspace).

use crate::cache::ReloadCache;
use crate::features::{self, KeySuggestion, KeyStatus};
use crate::index::{AggregatedIndex, IndexRef, MetadataIndex};
use keyscope_api::{CanonicalName, HintValue, MetadataItem, SourceEnumerator, SourceId};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};

struct ModuleState {
    sources: BTreeSet<SourceId>,
    order: Vec<SourceId>,
    index: Arc<dyn MetadataIndex>,
}

/// Aggregated, lazily revalidated view over every source a module sees.
///
/// The published index holds lazy references into the shared
/// [`ReloadCache`], so edits to a source show up without rebuilding the
/// module aggregate; only a change in the set of sources does.
pub struct ModuleMetadata {
    name: String,
    cache: Arc<ReloadCache>,
    enumerator: Arc<dyn SourceEnumerator>,
    state: RwLock<ModuleState>,
    refresh: Mutex<()>,
}

impl ModuleMetadata {
    pub fn new(
        name: impl Into<String>,
        cache: Arc<ReloadCache>,
        enumerator: Arc<dyn SourceEnumerator>,
    ) -> Self {
        let state = ModuleState {
            sources: BTreeSet::new(),
            order: Vec::new(),
            index: cache.empty_index(),
        };
        let module = Self {
            name: name.into(),
            cache,
            enumerator,
            state: RwLock::new(state),
            refresh: Mutex::new(()),
        };
        module.refresh();
        module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache(&self) -> &Arc<ReloadCache> {
        &self.cache
    }

    /// Currently published index.
    pub fn index(&self) -> Arc<dyn MetadataIndex> {
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&state.index)
    }

    /// Sources of the published index, in precedence order.
    pub fn sources(&self) -> Vec<SourceId> {
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        state.order.clone()
    }

    /// Re-enumerates sources. Returns true when a new index was published.
    pub fn refresh(&self) -> bool {
        self.refresh_with(&[])
    }

    /// Like [`refresh`](Self::refresh), placing `additional` sources ahead of
    /// the enumerated ones.
    pub fn refresh_with(&self, additional: &[SourceId]) -> bool {
        let _guard = self.refresh.lock().unwrap_or_else(|p| p.into_inner());
        debug!("Try refreshing metadata for module {}", self.name);

        let mut order: Vec<SourceId> = Vec::new();
        for id in additional
            .iter()
            .cloned()
            .chain(self.enumerator.sources_for(&self.name))
        {
            if !order.contains(&id) {
                order.push(id);
            }
        }
        let sources: BTreeSet<SourceId> = order.iter().cloned().collect();

        {
            let state = self.state.read().unwrap_or_else(|p| p.into_inner());
            if state.sources == sources {
                return false;
            }
        }
        info!(
            "Module \"{}\"'s metadata needs refresh ({} sources)",
            self.name,
            order.len()
        );

        let mut aggregated = AggregatedIndex::new();
        for id in &order {
            let entry: Arc<dyn IndexRef> = self.cache.reference(id);
            aggregated.add_last_ref(entry);
        }
        if aggregated.is_empty() {
            debug!("Module {} has no metadata yet, keeping previous index", self.name);
            return false;
        }

        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        *state = ModuleState {
            sources,
            order,
            index: Arc::new(aggregated),
        };
        true
    }

    pub fn lookup(&self, name: &str) -> Option<MetadataItem> {
        self.index().lookup(&CanonicalName::adapt(name))
    }

    pub fn find_candidates(&self, ancestor: &str, query: &str) -> Vec<MetadataItem> {
        let index = self.index();
        features::CompletionSearch::new(index.as_ref())
            .find_candidates(&CanonicalName::adapt(ancestor), query)
    }

    pub fn suggest_keys(&self, parent: &str, query: &str) -> Vec<KeySuggestion> {
        let index = self.index();
        let types = self.cache.types();
        features::suggest_keys(
            index.as_ref(),
            types.as_ref(),
            &CanonicalName::adapt(parent),
            query,
        )
    }

    pub fn suggest_values(&self, name: &str, query: &str) -> Vec<HintValue> {
        let index = self.index();
        let types = self.cache.types();
        features::suggest_values(
            index.as_ref(),
            types.as_ref(),
            &CanonicalName::adapt(name),
            query,
        )
    }

    pub fn check_key(&self, key: &str) -> KeyStatus {
        let index = self.index();
        let types = self.cache.types();
        features::check_key(index.as_ref(), types.as_ref(), &CanonicalName::adapt(key))
    }
}
