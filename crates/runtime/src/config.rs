//! The `keyscope.json` workspace descriptor.

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_FILE: &str = "keyscope.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
    /// Class descriptor files for the type oracle.
    #[serde(default)]
    pub type_descriptors: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    /// Output directories and JARs, highest precedence first.
    #[serde(default)]
    pub class_roots: Vec<PathBuf>,
    /// Directories scanned for dependency JARs, appended after `class_roots`.
    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,
}

impl WorkspaceConfig {
    /// Reads a descriptor. Relative paths are resolved against the
    /// directory containing it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&content).map_err(|e| match e {
            RuntimeError::Config { message, .. } => RuntimeError::Config {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WorkspaceConfig =
            serde_json::from_str(json).map_err(|e| RuntimeError::Config {
                path: PathBuf::from(DESCRIPTOR_FILE),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut names = std::collections::HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(RuntimeError::Config {
                    path: PathBuf::from(DESCRIPTOR_FILE),
                    message: "module without a name".to_string(),
                });
            }
            if !names.insert(module.name.as_str()) {
                return Err(RuntimeError::Config {
                    path: PathBuf::from(DESCRIPTOR_FILE),
                    message: format!("duplicate module \"{}\"", module.name),
                });
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for module in &mut self.modules {
            module.class_roots.iter_mut().for_each(resolve);
            module.library_dirs.iter_mut().for_each(resolve);
        }
        self.type_descriptors.iter_mut().for_each(resolve);
    }
}
