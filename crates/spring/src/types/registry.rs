//! Class descriptors for the types referenced by metadata.
//!
//! Descriptor files are JSON documents of the form
//! `{"classes": [{"name": "...", "fields": [...], "enumConstants": [...]}]}`,
//! typically produced once per dependency set by a build plugin.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDescriptor {
    pub name: String,
    /// Bindable properties in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub enum_constants: Vec<EnumConstant>,
}

impl ClassDescriptor {
    pub fn is_enum(&self) -> bool {
        !self.enum_constants.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    classes: Vec<ClassDescriptor>,
}

/// Classes by fully qualified name, with `$` normalized to `.`.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    classes: HashMap<String, Arc<ClassDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class. A later registration of the same name is ignored.
    pub fn register(&mut self, mut class: ClassDescriptor) {
        class.name = class.name.replace('$', ".");
        self.classes
            .entry(class.name.clone())
            .or_insert_with(|| Arc::new(class));
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut registry = Self::new();
        registry.extend_from_json_str(json)?;
        Ok(registry)
    }

    pub fn extend_from_json_str(&mut self, json: &str) -> Result<usize> {
        let file: DescriptorFile = serde_json::from_str(json)?;
        let count = file.classes.len();
        for class in file.classes {
            self.register(class);
        }
        Ok(count)
    }

    /// Loads a descriptor file into the registry.
    pub fn load_json(&mut self, path: &Path) -> Result<usize> {
        let json = std::fs::read_to_string(path)?;
        let count = self.extend_from_json_str(&json)?;
        tracing::debug!("Loaded {} class descriptors from {}", count, path.display());
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        match self.classes.get(name) {
            Some(class) => Some(class.as_ref()),
            None if name.contains('$') => {
                self.classes.get(&name.replace('$', ".")).map(Arc::as_ref)
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
