//! Source enumerators: which metadata files a module can see.

use crate::files::metadata_source_in_class_root;
use keyscope_api::{SourceEnumerator, SourceId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Maps each module to its ordered class roots (output directories first,
/// then dependency JARs) and reports the metadata source of each root.
#[derive(Debug, Default, Clone)]
pub struct ClassRootEnumerator {
    modules: BTreeMap<String, Vec<PathBuf>>,
}

impl ClassRootEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds class roots to `module`, after the ones it already has.
    pub fn add_module(
        &mut self,
        module: impl Into<String>,
        class_roots: impl IntoIterator<Item = PathBuf>,
    ) {
        self.modules
            .entry(module.into())
            .or_default()
            .extend(class_roots);
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn class_roots(&self, module: &str) -> &[PathBuf] {
        self.modules.get(module).map(Vec::as_slice).unwrap_or_default()
    }
}

impl SourceEnumerator for ClassRootEnumerator {
    fn sources_for(&self, consumer: &str) -> Vec<SourceId> {
        let mut sources = Vec::new();
        for root in self.class_roots(consumer) {
            if let Some(id) = metadata_source_in_class_root(root)
                && !sources.contains(&id)
            {
                sources.push(id);
            }
        }
        tracing::debug!("Module {} sees {} metadata sources", consumer, sources.len());
        sources
    }
}

/// Fixed list of sources shared by every consumer.
#[derive(Debug, Default, Clone)]
pub struct StaticSourceEnumerator {
    sources: Vec<SourceId>,
}

impl StaticSourceEnumerator {
    pub fn new(sources: Vec<SourceId>) -> Self {
        Self { sources }
    }
}

impl SourceEnumerator for StaticSourceEnumerator {
    fn sources_for(&self, _consumer: &str) -> Vec<SourceId> {
        self.sources.clone()
    }
}

/// JAR files below `dir`, sorted, skipping source and javadoc JARs.
pub fn discover_jars(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut jars: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("jar"))
        .filter(|e| {
            // Exclude sources and javadoc JARs
            let name = e.path().file_name().and_then(|n| n.to_str()).unwrap_or("");
            !name.ends_with("-sources.jar") && !name.ends_with("-javadoc.jar")
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    jars.sort();
    jars
}
