use super::BoxError;
use crate::models::{ModificationToken, SourceId};

/// Read access to metadata sources.
pub trait SourceStore: Send + Sync {
    /// Current change marker of `source`, or `None` when the source no longer
    /// exists or cannot be inspected.
    ///
    /// Must be cheap: it is called on every cache lookup.
    fn modification_token(&self, source: &SourceId) -> Option<ModificationToken>;

    /// Full content of `source`.
    fn read(&self, source: &SourceId) -> Result<Vec<u8>, BoxError>;
}

/// Lists the metadata sources visible to a consumer (a module, a project).
pub trait SourceEnumerator: Send + Sync {
    /// Sources in precedence order, highest first.
    fn sources_for(&self, consumer: &str) -> Vec<SourceId>;
}
