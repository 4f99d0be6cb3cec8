use super::reload::{ReloadCache, ReloadOutcome};
use crate::error::{KeyscopeError, Result};
use keyscope_api::SourceId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a background refresh did to each source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub reloaded: Vec<SourceId>,
    pub unchanged: Vec<SourceId>,
    pub evicted: Vec<SourceId>,
    pub failed: Vec<(SourceId, String)>,
    /// Set when the token fired before every source was visited.
    pub cancelled: bool,
}

impl RefreshReport {
    pub fn total(&self) -> usize {
        self.reloaded.len() + self.unchanged.len() + self.evicted.len() + self.failed.len()
    }
}

impl ReloadCache {
    /// Reloads `ids` one by one on the blocking pool.
    ///
    /// Cancellation is checked between sources. A parse already running when
    /// the token fires is not interrupted; it finishes and publishes as usual.
    pub async fn refresh_sources(
        self: Arc<Self>,
        ids: Vec<SourceId>,
        cancel_token: CancellationToken,
    ) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();

        for id in ids {
            if cancel_token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let cache = Arc::clone(&self);
            let task_id = id.clone();
            let task = tokio::task::spawn_blocking(move || cache.reload(&task_id));

            let outcome = tokio::select! {
                _ = cancel_token.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                joined = task => joined.map_err(|e| KeyscopeError::Internal(e.to_string()))?,
            };

            match outcome {
                Ok(ReloadOutcome::Rebuilt) => report.reloaded.push(id),
                Ok(ReloadOutcome::Unchanged) => report.unchanged.push(id),
                Err(KeyscopeError::SourceUnavailable(_)) => report.evicted.push(id),
                Err(e) => report.failed.push((id, e.to_string())),
            }
        }

        tracing::info!(
            "Refresh finished: {} reloaded, {} unchanged, {} evicted, {} failed{}",
            report.reloaded.len(),
            report.unchanged.len(),
            report.evicted.len(),
            report.failed.len(),
            if report.cancelled { " (cancelled)" } else { "" }
        );
        Ok(report)
    }
}
