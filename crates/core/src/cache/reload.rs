//! Per-project cache of source indexes with change detection.
//!
//! Each source has one [`CachedSource`] entry holding the last published
//! index together with the modification token it was built from. Readers
//! compare tokens on every access and never block behind a rebuild: while
//! one caller reparses a changed source, the others keep getting the
//! previous snapshot.

use crate::error::{KeyscopeError, Result};
use crate::index::{AggregatedIndex, IndexRef, MetadataIndex, SourceIndex};
use dashmap::DashMap;
use keyscope_api::{
    CanonicalName, ConfigurationMetadata, MetadataParser, ModificationToken, ProjectId, SourceId,
    SourceStore, TypeOracle,
};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};
use tracing::{debug, info, warn};

fn lock_unpoison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Result of an explicit reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Unchanged,
    Rebuilt,
}

/// Collaborators needed to turn a source into an index.
struct SourceLoader {
    project: ProjectId,
    store: Arc<dyn SourceStore>,
    parser: Arc<dyn MetadataParser>,
    types: Arc<dyn TypeOracle>,
}

impl SourceLoader {
    /// The explicit declarations first, then one synthesized index per
    /// collection or map property. Deeper roots win among synthesized
    /// indexes, ties broken by name.
    fn build(&self, id: &SourceId, metadata: &ConfigurationMetadata) -> Arc<dyn MetadataIndex> {
        let base = SourceIndex::build(self.project.clone(), id.as_str(), metadata);

        let mut synthesized: Vec<(CanonicalName, SourceIndex)> = Vec::new();
        for (name, property) in base.properties() {
            let Some(type_name) = property.type_name.as_deref() else {
                continue;
            };
            if !self.types.is_collection_or_map(type_name) {
                continue;
            }
            if let Some(structure) = self.types.structure(&name, type_name) {
                let source = format!("{id}#{name}");
                synthesized.push((
                    name,
                    SourceIndex::build(self.project.clone(), source, &structure),
                ));
            }
        }

        if synthesized.is_empty() {
            return Arc::new(base);
        }
        synthesized.sort_by(|(a, _), (b, _)| (Reverse(a.len()), a).cmp(&(Reverse(b.len()), b)));

        let mut aggregated = AggregatedIndex::new();
        aggregated.add_last(Arc::new(base));
        for (_, index) in synthesized {
            aggregated.add_last(Arc::new(index));
        }
        Arc::new(aggregated)
    }
}

struct Published {
    token: ModificationToken,
    index: Arc<dyn MetadataIndex>,
}

/// Cache entry for one source. Doubles as a lazy [`IndexRef`].
pub struct CachedSource {
    id: SourceId,
    loader: Arc<SourceLoader>,
    published: RwLock<Option<Published>>,
    refresh: Mutex<()>,
    /// Token of the last content that failed to parse.
    rejected: Mutex<Option<ModificationToken>>,
    rebuilds: AtomicU64,
}

impl std::fmt::Debug for CachedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSource")
            .field("id", &self.id)
            .field("rebuilds", &self.rebuild_count())
            .finish()
    }
}

impl CachedSource {
    fn new(id: SourceId, loader: Arc<SourceLoader>) -> Self {
        Self {
            id,
            loader,
            published: RwLock::new(None),
            refresh: Mutex::new(()),
            rejected: Mutex::new(None),
            rebuilds: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// How many times this entry has parsed and published its source.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    fn published_index(&self) -> Option<Arc<dyn MetadataIndex>> {
        let published = self.published.read().unwrap_or_else(|p| p.into_inner());
        published.as_ref().map(|p| Arc::clone(&p.index))
    }

    fn published_token(&self) -> Option<ModificationToken> {
        let published = self.published.read().unwrap_or_else(|p| p.into_inner());
        published.as_ref().map(|p| p.token)
    }

    fn clear(&self) {
        let mut published = self.published.write().unwrap_or_else(|p| p.into_inner());
        *published = None;
    }

    /// Blocking reload: waits for any in-flight rebuild of this entry.
    pub fn reload(&self) -> Result<ReloadOutcome> {
        let guard = lock_unpoison(&self.refresh);
        self.reload_locked(&guard)
    }

    fn reload_locked(&self, _guard: &MutexGuard<'_, ()>) -> Result<ReloadOutcome> {
        let Some(token) = self.loader.store.modification_token(&self.id) else {
            self.clear();
            return Err(KeyscopeError::SourceUnavailable(self.id.to_string()));
        };
        if self.published_token() == Some(token) {
            return Ok(ReloadOutcome::Unchanged);
        }

        let bytes = match self.loader.store.read(&self.id) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.clear();
                warn!("Source {} became unreadable: {}", self.id, e);
                return Err(KeyscopeError::SourceUnavailable(self.id.to_string()));
            }
        };

        // A failed parse leaves the previous snapshot in place.
        let metadata = self.loader.parser.parse(&self.id, &bytes).map_err(|e| {
            warn!("Failed to parse {}: {}", self.id, e);
            *lock_unpoison(&self.rejected) = Some(token);
            KeyscopeError::ParseFailure {
                source_id: self.id.to_string(),
                message: e.to_string(),
            }
        })?;

        let index = self.loader.build(&self.id, &metadata);
        *lock_unpoison(&self.rejected) = None;
        {
            let mut published = self.published.write().unwrap_or_else(|p| p.into_inner());
            *published = Some(Published { token, index });
        }
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        debug!("Published index for {}", self.id);
        Ok(ReloadOutcome::Rebuilt)
    }
}

impl IndexRef for CachedSource {
    fn resolve(&self) -> Option<Arc<dyn MetadataIndex>> {
        let current = self.loader.store.modification_token(&self.id);
        if current.is_some()
            && (current == self.published_token() || current == *lock_unpoison(&self.rejected))
        {
            return self.published_index();
        }

        let guard = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            // Someone else is rebuilding; serve what we have.
            Err(TryLockError::WouldBlock) => return self.published_index(),
        };
        match self.reload_locked(&guard) {
            Ok(_) | Err(KeyscopeError::ParseFailure { .. }) => self.published_index(),
            Err(e) => {
                debug!("Dropping {} from lookups: {}", self.id, e);
                None
            }
        }
    }
}

/// Cache of per-source indexes for one project.
///
/// Scoped explicitly: create one per project and drop it (or call
/// [`ReloadCache::clear`]) when the project goes away.
pub struct ReloadCache {
    loader: Arc<SourceLoader>,
    entries: DashMap<SourceId, Arc<CachedSource>>,
}

impl std::fmt::Debug for ReloadCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadCache")
            .field("project", &self.loader.project)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ReloadCache {
    pub fn new(
        project: ProjectId,
        store: Arc<dyn SourceStore>,
        parser: Arc<dyn MetadataParser>,
        types: Arc<dyn TypeOracle>,
    ) -> Self {
        Self {
            loader: Arc::new(SourceLoader {
                project,
                store,
                parser,
                types,
            }),
            entries: DashMap::new(),
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.loader.project
    }

    pub fn types(&self) -> Arc<dyn TypeOracle> {
        Arc::clone(&self.loader.types)
    }

    /// Index with no records for this project.
    pub fn empty_index(&self) -> Arc<dyn MetadataIndex> {
        Arc::new(SourceIndex::empty(self.loader.project.clone(), "empty"))
    }

    /// Entry for `id`, created on first use. Nothing is parsed until the
    /// entry is resolved.
    pub fn reference(&self, id: &SourceId) -> Arc<CachedSource> {
        let entry = self
            .entries
            .entry(id.clone())
            .or_insert_with(|| Arc::new(CachedSource::new(id.clone(), Arc::clone(&self.loader))));
        Arc::clone(entry.value())
    }

    /// Current index of `id`, reloading it when its token changed.
    pub fn get(&self, id: &SourceId) -> Option<Arc<dyn MetadataIndex>> {
        let index = self.reference(id).resolve();
        if index.is_none() && self.loader.store.modification_token(id).is_none() {
            self.evict(id);
        }
        index
    }

    /// Reloads `id` now, waiting for a concurrent rebuild if needed.
    /// Sources that vanished are evicted.
    pub fn reload(&self, id: &SourceId) -> Result<ReloadOutcome> {
        let outcome = self.reference(id).reload();
        match &outcome {
            Ok(ReloadOutcome::Rebuilt) => info!("Reloaded metadata from {}", id),
            Err(KeyscopeError::SourceUnavailable(_)) => self.evict(id),
            _ => {}
        }
        outcome
    }

    /// Drops the entry for `id`. Aggregates still holding it see the source
    /// as absent until it reappears.
    pub fn evict(&self, id: &SourceId) {
        if let Some((_, entry)) = self.entries.remove(id) {
            entry.clear();
            debug!("Evicted {}", id);
        }
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        let mut ids: Vec<SourceId> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Drops every entry.
    pub fn clear(&self) {
        for entry in self.entries.iter() {
            entry.value().clear();
        }
        self.entries.clear();
    }
}
