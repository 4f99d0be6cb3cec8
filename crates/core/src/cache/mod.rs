pub mod refresh;
pub mod reload;

pub use refresh::RefreshReport;
pub use reload::{CachedSource, ReloadCache, ReloadOutcome};
