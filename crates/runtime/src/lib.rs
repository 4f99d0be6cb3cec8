//! Assembles the Spring collaborators into a ready-to-query workspace.

pub mod config;
pub mod error;
pub mod workspace;

pub use config::{ModuleConfig, WorkspaceConfig};
pub use error::{Result, RuntimeError};
pub use workspace::{DEFAULT_MODULE, Workspace};

/// Initializes the logging system for a specific component.
/// This delegates to the core logging module.
pub fn init_logging(component: &str, to_stderr: bool) -> impl Drop {
    keyscope_core::logging::init_logging(component, to_stderr)
}
