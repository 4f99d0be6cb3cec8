pub mod cap;
pub mod models;

// Re-export commonly used types
pub use cap::{
    BoxError, MetadataParser, NoTypeOracle, SourceEnumerator, SourceStore, TypeOracle, TypeShape,
};
pub use models::*;
