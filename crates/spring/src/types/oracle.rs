use super::{JavaType, TypeRegistry};
use keyscope_api::models::name::to_dashed;
use keyscope_api::{
    CanonicalName, ConfigurationMetadata, RawGroup, RawProperty, TypeOracle, TypeShape, ValueHint,
};
use std::collections::HashSet;

/// Nesting limit for synthesized structure; beans deeper than this are
/// left for the user to type.
const MAX_DEPTH: usize = 8;

const MAP_TYPES: &[&str] = &[
    "java.util.Map",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.TreeMap",
    "java.util.SortedMap",
    "java.util.NavigableMap",
    "java.util.EnumMap",
    "java.util.concurrent.ConcurrentMap",
    "java.util.concurrent.ConcurrentHashMap",
];

const COLLECTION_TYPES: &[&str] = &[
    "java.lang.Iterable",
    "java.util.Collection",
    "java.util.List",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.Set",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.SortedSet",
    "java.util.NavigableSet",
    "java.util.TreeSet",
    "java.util.EnumSet",
    "java.util.Queue",
    "java.util.Deque",
];

const SCALAR_TYPES: &[&str] = &[
    "boolean",
    "byte",
    "short",
    "int",
    "long",
    "float",
    "double",
    "char",
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Double",
    "java.lang.Character",
    "java.lang.Number",
    "java.lang.String",
    "java.lang.CharSequence",
    "java.lang.Object",
    "java.lang.Class",
    "java.math.BigDecimal",
    "java.math.BigInteger",
    "java.io.File",
    "java.net.InetAddress",
    "java.net.URI",
    "java.net.URL",
    "java.nio.charset.Charset",
    "java.nio.file.Path",
    "java.time.Duration",
    "java.time.Period",
    "java.time.ZoneId",
    "java.util.Locale",
    "java.util.TimeZone",
    "java.util.UUID",
    "java.util.regex.Pattern",
    "org.springframework.core.io.Resource",
    "org.springframework.util.MimeType",
    "org.springframework.util.unit.DataSize",
];

/// Classifies Java type strings, consulting a registry of class
/// descriptors for beans and enums.
#[derive(Debug, Default, Clone)]
pub struct JavaTypeOracle {
    registry: TypeRegistry,
}

impl JavaTypeOracle {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn classify(&self, ty: &JavaType) -> TypeShape {
        let ty = ty.resolved();
        let name = match &ty {
            JavaType::Array(element) => {
                return TypeShape::Collection {
                    element: element.resolved().to_string(),
                };
            }
            JavaType::Class { name, .. } => name.as_str(),
            JavaType::Wildcard(_) => return TypeShape::Unknown,
        };
        let arg = |i: usize| {
            ty.args()
                .get(i)
                .map(|a| a.resolved().to_string())
                .unwrap_or_else(|| "java.lang.Object".to_string())
        };

        if name == "java.util.Properties" {
            return TypeShape::Map {
                key: "java.lang.String".into(),
                value: "java.lang.String".into(),
            };
        }
        if MAP_TYPES.contains(&name) {
            return TypeShape::Map {
                key: arg(0),
                value: arg(1),
            };
        }
        if COLLECTION_TYPES.contains(&name) {
            return TypeShape::Collection { element: arg(0) };
        }
        if SCALAR_TYPES.contains(&name) {
            return TypeShape::Scalar;
        }
        match self.registry.get(name) {
            Some(class) if class.is_enum() => TypeShape::Scalar,
            Some(class) if !class.fields.is_empty() => TypeShape::Bean,
            _ => TypeShape::Unknown,
        }
    }

    fn is_plain_value(&self, type_name: &str) -> bool {
        match self.shape(type_name) {
            TypeShape::Scalar => true,
            TypeShape::Collection { element } => {
                matches!(self.shape(&element), TypeShape::Scalar)
            }
            TypeShape::Map { .. } => self.is_value_map(type_name),
            TypeShape::Bean | TypeShape::Unknown => false,
        }
    }

    /// Emits the records describing values of `type_name` bound at `name`.
    fn describe(
        &self,
        name: &CanonicalName,
        type_name: &str,
        depth: usize,
        visiting: &mut HashSet<String>,
        out: &mut ConfigurationMetadata,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        match self.shape(type_name) {
            TypeShape::Map { value: element, .. } | TypeShape::Collection { element } => {
                self.describe(&name.append_placeholder(), &element, depth + 1, visiting, out);
            }
            TypeShape::Bean => {
                let Some(class) = self.registry.get(erased(type_name).as_str()) else {
                    return;
                };
                if !visiting.insert(class.name.clone()) {
                    return;
                }
                for field in &class.fields {
                    let child = name.append(&to_dashed(&field.name));
                    if matches!(self.shape(&field.type_name), TypeShape::Bean) {
                        out.groups.push(RawGroup {
                            name: child.to_string(),
                            type_name: Some(field.type_name.clone()),
                            source_type: Some(class.name.clone()),
                            description: field.description.clone(),
                            ..Default::default()
                        });
                    } else {
                        out.properties.push(RawProperty {
                            name: child.to_string(),
                            type_name: Some(field.type_name.clone()),
                            source_type: Some(class.name.clone()),
                            description: field.description.clone(),
                            ..Default::default()
                        });
                    }
                    self.describe(&child, &field.type_name, depth + 1, visiting, out);
                }
                visiting.remove(&class.name);
            }
            // Plain values bind at `name` itself and need no records.
            TypeShape::Scalar | TypeShape::Unknown => {}
        }
    }
}

fn erased(type_name: &str) -> String {
    JavaType::parse(type_name)
        .and_then(|ty| ty.resolved().class_name().map(str::to_string))
        .unwrap_or_else(|| type_name.to_string())
}

impl TypeOracle for JavaTypeOracle {
    fn shape(&self, type_name: &str) -> TypeShape {
        match JavaType::parse(type_name) {
            Some(ty) => self.classify(&ty),
            None => TypeShape::Unknown,
        }
    }

    fn is_value_map(&self, type_name: &str) -> bool {
        match self.shape(type_name) {
            TypeShape::Map { value, .. } => self.is_plain_value(&value),
            _ => false,
        }
    }

    fn value_hints(&self, type_name: &str) -> Vec<ValueHint> {
        let name = erased(type_name);
        if name == "boolean" || name == "java.lang.Boolean" {
            return ["true", "false"]
                .into_iter()
                .map(|value| ValueHint {
                    value: value.to_string(),
                    description: None,
                })
                .collect();
        }
        match self.registry.get(&name) {
            Some(class) if class.is_enum() => class
                .enum_constants
                .iter()
                .map(|constant| ValueHint {
                    value: to_dashed(&constant.name).to_lowercase(),
                    description: constant.description.clone(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn structure(&self, root: &CanonicalName, type_name: &str) -> Option<ConfigurationMetadata> {
        if !self.is_collection_or_map(type_name) {
            return None;
        }
        let mut out = ConfigurationMetadata::default();
        self.describe(root, type_name, 0, &mut HashSet::new(), &mut out);
        if out.is_empty() {
            return None;
        }
        tracing::trace!(
            "Synthesized {} properties below {} ({})",
            out.properties.len(),
            root,
            type_name
        );
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle() -> JavaTypeOracle {
        let registry = TypeRegistry::from_json_str(
            r#"{"classes": [
                {"name": "a.Region", "fields": [
                    {"name": "timeToLive", "type": "java.time.Duration", "description": "Entry lifetime."},
                    {"name": "mode", "type": "a.Mode"},
                    {"name": "tags", "type": "java.util.Map<java.lang.String,java.lang.String>"},
                    {"name": "limits", "type": "a.Limits"}
                ]},
                {"name": "a.Limits", "fields": [{"name": "maxSize", "type": "int"}]},
                {"name": "a.Node", "fields": [
                    {"name": "label", "type": "java.lang.String"},
                    {"name": "children", "type": "java.util.List<a.Node>"}
                ]},
                {"name": "a.Mode", "enumConstants": [{"name": "ON_ERROR", "description": "Only on errors."}, {"name": "ALWAYS"}]}
            ]}"#,
        )
        .unwrap();
        JavaTypeOracle::new(registry)
    }

    #[test]
    fn test_shapes() {
        let o = oracle();
        assert_eq!(
            o.shape("java.util.Map<java.lang.String, a.Region>"),
            TypeShape::Map {
                key: "java.lang.String".into(),
                value: "a.Region".into()
            }
        );
        assert_eq!(
            o.shape("java.util.List<? extends java.lang.Integer>"),
            TypeShape::Collection {
                element: "java.lang.Integer".into()
            }
        );
        assert_eq!(
            o.shape("java.lang.String[]"),
            TypeShape::Collection {
                element: "java.lang.String".into()
            }
        );
        assert_eq!(o.shape("a.Mode"), TypeShape::Scalar);
        assert_eq!(o.shape("a.Region"), TypeShape::Bean);
        assert_eq!(o.shape("a.Unknown"), TypeShape::Unknown);
        assert_eq!(o.shape("java.util.Map<"), TypeShape::Unknown);
    }

    #[test]
    fn test_value_maps() {
        let o = oracle();
        assert!(o.is_value_map("java.util.Map<java.lang.String,java.lang.String>"));
        assert!(o.is_value_map("java.util.Properties"));
        assert!(o.is_value_map("java.util.Map<java.lang.String,java.util.List<java.lang.String>>"));
        assert!(o.is_value_map(
            "java.util.Map<java.lang.String,java.util.Map<java.lang.String,a.Mode>>"
        ));
        assert!(!o.is_value_map("java.util.Map<java.lang.String,a.Region>"));
        assert!(!o.is_value_map("java.util.List<java.lang.String>"));
    }

    #[test]
    fn test_value_hints() {
        let o = oracle();
        let booleans: Vec<String> = o.value_hints("boolean").into_iter().map(|h| h.value).collect();
        assert_eq!(booleans, vec!["true", "false"]);

        let modes = o.value_hints("a.Mode");
        assert_eq!(modes[0].value, "on-error");
        assert_eq!(modes[0].description.as_deref(), Some("Only on errors."));
        assert_eq!(modes[1].value, "always");
        assert!(o.value_hints("java.lang.String").is_empty());
    }

    #[test]
    fn test_structure_of_bean_map() {
        let o = oracle();
        let root = CanonicalName::adapt("cache.regions");
        let doc = o
            .structure(&root, "java.util.Map<java.lang.String,a.Region>")
            .unwrap();

        let properties: Vec<&str> = doc.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            properties,
            vec![
                "cache.regions[*].time-to-live",
                "cache.regions[*].mode",
                "cache.regions[*].tags",
                "cache.regions[*].limits.max-size",
            ]
        );
        assert_eq!(doc.groups.len(), 1);
        assert_eq!(doc.groups[0].name, "cache.regions[*].limits");
        assert_eq!(
            doc.properties[0].description.as_deref(),
            Some("Entry lifetime.")
        );
    }

    #[test]
    fn test_structure_of_recursive_bean_terminates() {
        let o = oracle();
        let root = CanonicalName::adapt("tree.nodes");
        let doc = o.structure(&root, "java.util.List<a.Node>").unwrap();
        let names: Vec<&str> = doc.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["tree.nodes[*].label", "tree.nodes[*].children"]);
    }

    #[test]
    fn test_no_structure_for_plain_values() {
        let o = oracle();
        let root = CanonicalName::adapt("app.labels");
        assert!(o
            .structure(&root, "java.util.Map<java.lang.String,java.lang.String>")
            .is_none());
        assert!(o.structure(&root, "a.Region").is_none());
        assert!(o.structure(&root, "java.util.List<a.Unknown>").is_none());
    }
}
