//! Spring Boot adapters: metadata files on disk and in JARs, the JSON
//! document parser, and a descriptor-driven Java type oracle.

pub mod enumerate;
pub mod error;
pub mod files;
pub mod parser;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use enumerate::{ClassRootEnumerator, StaticSourceEnumerator, discover_jars};
pub use error::SpringError;
pub use files::{SourceLocation, metadata_source_in_class_root};
pub use parser::JsonMetadataParser;
pub use store::FsSourceStore;
pub use types::{JavaType, JavaTypeOracle, TypeRegistry};
