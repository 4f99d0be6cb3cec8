use crate::index::MetadataIndex;
use keyscope_api::{CanonicalName, Hint, HintValue, Property, TypeOracle, TypeShape};
use std::collections::HashSet;
use std::sync::Arc;

/// A property seen through the index it was found in and a type oracle.
pub struct PropertyView<'a> {
    property: &'a Property,
    index: &'a dyn MetadataIndex,
    types: &'a dyn TypeOracle,
}

impl<'a> PropertyView<'a> {
    pub fn new(
        property: &'a Property,
        index: &'a dyn MetadataIndex,
        types: &'a dyn TypeOracle,
    ) -> Self {
        Self {
            property,
            index,
            types,
        }
    }

    pub fn property(&self) -> &Property {
        self.property
    }

    fn type_name(&self) -> Option<&str> {
        self.property.type_name.as_deref()
    }

    /// Hint named like the property, else `<name>.values`.
    pub fn hint(&self) -> Option<Arc<Hint>> {
        let name = &self.property.name;
        self.index
            .hint(name)
            .or_else(|| self.index.hint(&name.append("values")))
    }

    /// Hint named `<name>.keys`.
    pub fn key_hint(&self) -> Option<Arc<Hint>> {
        self.index.hint(&self.property.name.append("keys"))
    }

    pub fn is_map_type(&self) -> bool {
        self.type_name().is_some_and(|t| self.types.is_map(t))
    }

    pub fn is_value_map(&self) -> bool {
        self.type_name().is_some_and(|t| self.types.is_value_map(t))
    }

    /// Declared hint values followed by the values implied by the type.
    pub fn hint_values(&self) -> Vec<HintValue> {
        let declared = self.hint();
        let implied = self.type_name().map(|t| match self.types.shape(t) {
            TypeShape::Map { value, .. } => self.types.value_hints(&value),
            TypeShape::Collection { element } => self.types.value_hints(&element),
            _ => self.types.value_hints(t),
        });
        combine(declared.as_deref(), implied.unwrap_or_default())
    }

    /// Declared key hint values followed by the values implied by the map key type.
    pub fn key_hint_values(&self) -> Vec<HintValue> {
        let declared = self.key_hint();
        let implied = match self.type_name().map(|t| self.types.shape(t)) {
            Some(TypeShape::Map { key, .. }) => self.types.value_hints(&key),
            _ => Vec::new(),
        };
        combine(declared.as_deref(), implied)
    }

    /// Whether a value written under `key` binds to this property.
    pub fn can_bind(&self, key: &CanonicalName) -> bool {
        *key == self.property.name
            || (self.property.name.is_ancestor_of(key) && self.is_value_map())
    }
}

fn combine(declared: Option<&Hint>, implied: Vec<keyscope_api::ValueHint>) -> Vec<HintValue> {
    let mut seen = HashSet::new();
    declared
        .into_iter()
        .flat_map(|hint| hint.values.iter())
        .chain(implied.iter())
        .filter(|value| seen.insert(value.value.clone()))
        .map(HintValue::from)
        .collect()
}
