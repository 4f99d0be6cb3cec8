use crate::models::{CanonicalName, ConfigurationMetadata, ValueHint};

/// Coarse classification of a declared property type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// A single bindable value (string, number, enum, duration...).
    Scalar,
    /// A list, set or array of `element`.
    Collection { element: String },
    /// A map from `key` to `value`.
    Map { key: String, value: String },
    /// A nested configuration bean.
    Bean,
    Unknown,
}

/// Answers questions about Java types referenced by metadata.
pub trait TypeOracle: Send + Sync {
    fn shape(&self, type_name: &str) -> TypeShape;

    fn is_map(&self, type_name: &str) -> bool {
        matches!(self.shape(type_name), TypeShape::Map { .. })
    }

    fn is_collection_or_map(&self, type_name: &str) -> bool {
        matches!(
            self.shape(type_name),
            TypeShape::Map { .. } | TypeShape::Collection { .. }
        )
    }

    /// True for maps whose values are plain values rather than nested beans,
    /// i.e. maps that accept arbitrary keys at any depth below them.
    fn is_value_map(&self, type_name: &str) -> bool;

    /// Values implied by the type itself (booleans, enum constants).
    fn value_hints(&self, _type_name: &str) -> Vec<ValueHint> {
        Vec::new()
    }

    /// Metadata describing the element structure of a collection or map
    /// property rooted at `root`, using the `*` segment for keys and indices.
    fn structure(&self, _root: &CanonicalName, _type_name: &str) -> Option<ConfigurationMetadata> {
        None
    }
}

/// Oracle that knows nothing about types.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTypeOracle;

impl TypeOracle for NoTypeOracle {
    fn shape(&self, _type_name: &str) -> TypeShape {
        TypeShape::Unknown
    }

    fn is_value_map(&self, _type_name: &str) -> bool {
        false
    }
}
