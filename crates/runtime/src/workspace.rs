use crate::config::WorkspaceConfig;
use crate::error::{Result, RuntimeError};
use indexmap::IndexMap;
use keyscope_api::{ProjectId, SourceEnumerator, SourceId};
use keyscope_core::cache::{RefreshReport, ReloadCache};
use keyscope_core::service::ModuleMetadata;
use keyscope_spring::files::source_id_for_file;
use keyscope_spring::{
    ClassRootEnumerator, FsSourceStore, JavaTypeOracle, JsonMetadataParser,
    StaticSourceEnumerator, TypeRegistry, discover_jars,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Name of the module built from explicit metadata files.
pub const DEFAULT_MODULE: &str = "default";

/// One shared cache and the modules reading from it.
pub struct Workspace {
    cache: Arc<ReloadCache>,
    modules: IndexMap<String, Arc<ModuleMetadata>>,
}

impl Workspace {
    /// Loads the descriptor at `path` and builds every module it names.
    pub fn load(path: &Path) -> Result<Self> {
        let config = WorkspaceConfig::load(path)?;
        let project = path
            .parent()
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("workspace");
        Self::from_config(ProjectId::new(project), &config)
    }

    pub fn from_config(project: ProjectId, config: &WorkspaceConfig) -> Result<Self> {
        let mut registry = TypeRegistry::new();
        for descriptor in &config.type_descriptors {
            registry.load_json(descriptor)?;
        }
        let cache = new_cache(project, registry);

        let mut enumerator = ClassRootEnumerator::new();
        for module in &config.modules {
            let mut roots = module.class_roots.clone();
            for dir in &module.library_dirs {
                roots.extend(discover_jars(dir));
            }
            enumerator.add_module(module.name.clone(), roots);
        }
        let enumerator: Arc<dyn SourceEnumerator> = Arc::new(enumerator);

        let modules = config
            .modules
            .iter()
            .map(|module| {
                let metadata =
                    ModuleMetadata::new(module.name.clone(), cache.clone(), enumerator.clone());
                (module.name.clone(), Arc::new(metadata))
            })
            .collect();
        let workspace = Self { cache, modules };
        workspace.log_summary();
        Ok(workspace)
    }

    /// A single [`DEFAULT_MODULE`] over explicit metadata files, the first
    /// file taking precedence.
    pub fn from_sources(paths: &[PathBuf], type_descriptors: &[PathBuf]) -> Result<Self> {
        let mut registry = TypeRegistry::new();
        for descriptor in type_descriptors {
            registry.load_json(descriptor)?;
        }
        let cache = new_cache(ProjectId::new(DEFAULT_MODULE), registry);

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.is_file() {
                warn!("Metadata file {} does not exist yet", path.display());
            }
            sources.push(source_id_for_file(path)?);
        }
        let enumerator: Arc<dyn SourceEnumerator> = Arc::new(StaticSourceEnumerator::new(sources));
        let module = ModuleMetadata::new(DEFAULT_MODULE, cache.clone(), enumerator);

        let mut modules = IndexMap::new();
        modules.insert(DEFAULT_MODULE.to_string(), Arc::new(module));
        let workspace = Self { cache, modules };
        workspace.log_summary();
        Ok(workspace)
    }

    fn log_summary(&self) {
        for module in self.modules.values() {
            info!(
                "Module {}: {} metadata sources",
                module.name(),
                module.sources().len()
            );
        }
    }

    pub fn cache(&self) -> &Arc<ReloadCache> {
        &self.cache
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// The named module, or the first one when `name` is `None`.
    pub fn module(&self, name: Option<&str>) -> Result<Arc<ModuleMetadata>> {
        let found = match name {
            Some(name) => self.modules.get(name),
            None => self.modules.values().next(),
        };
        found
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownModule(name.unwrap_or("<none>").to_string()))
    }

    /// Re-enumerates every module. Returns how many published a new index.
    pub fn refresh_modules(&self) -> usize {
        self.modules.values().filter(|m| m.refresh()).count()
    }

    /// Every source visible to some module, without duplicates.
    pub fn sources(&self) -> Vec<SourceId> {
        let mut all = Vec::new();
        for module in self.modules.values() {
            for id in module.sources() {
                if !all.contains(&id) {
                    all.push(id);
                }
            }
        }
        all
    }

    /// Revalidates every visible source in the background.
    pub async fn refresh_sources(&self, cancel: CancellationToken) -> Result<RefreshReport> {
        let report = self
            .cache
            .clone()
            .refresh_sources(self.sources(), cancel)
            .await?;
        Ok(report)
    }
}

fn new_cache(project: ProjectId, registry: TypeRegistry) -> Arc<ReloadCache> {
    Arc::new(ReloadCache::new(
        project,
        Arc::new(FsSourceStore::new()),
        Arc::new(JsonMetadataParser),
        Arc::new(JavaTypeOracle::new(registry)),
    ))
}
