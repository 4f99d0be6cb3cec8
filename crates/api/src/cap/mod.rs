//! Capability traits implemented by ecosystem adapters.
//!
//! The index and cache only ever talk to files, documents and Java types
//! through these seams, which keeps them testable with in-memory fakes.

pub mod parse;
pub mod source;
pub mod typing;

pub use parse::MetadataParser;
pub use source::{SourceEnumerator, SourceStore};
pub use typing::{NoTypeOracle, TypeOracle, TypeShape};

/// Error type for capability operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
