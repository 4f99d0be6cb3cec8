pub mod cache;
pub mod error;
pub mod features;
pub mod index;
pub mod logging;
pub mod service;

pub use error::{KeyscopeError, Result};
pub use index::{AggregatedIndex, IndexRef, MetadataIndex, SourceIndex};
