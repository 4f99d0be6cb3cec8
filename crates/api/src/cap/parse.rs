use super::BoxError;
use crate::models::{ConfigurationMetadata, SourceId};

/// Turns the bytes of one metadata file into a structured document.
pub trait MetadataParser: Send + Sync {
    /// Parse `bytes` read from `source`.
    ///
    /// Implementations must not retain partial state on failure; the caller
    /// keeps serving its previous snapshot when this returns an error.
    fn parse(&self, source: &SourceId, bytes: &[u8]) -> Result<ConfigurationMetadata, BoxError>;
}
