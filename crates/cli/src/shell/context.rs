use keyscope_core::service::ModuleMetadata;
use keyscope_runtime::Workspace;
use std::sync::{Arc, RwLock};

/// State shared by the line editor, the completer and command handlers.
#[derive(Clone)]
pub struct ShellContext {
    pub workspace: Arc<Workspace>,
    pub rt_handle: tokio::runtime::Handle,
    module: Arc<RwLock<Arc<ModuleMetadata>>>,
    current_prefix: Arc<RwLock<Option<String>>>,
}

impl ShellContext {
    pub fn new(
        workspace: Arc<Workspace>,
        module: Arc<ModuleMetadata>,
        rt_handle: tokio::runtime::Handle,
    ) -> Self {
        Self {
            workspace,
            rt_handle,
            module: Arc::new(RwLock::new(module)),
            current_prefix: Arc::new(RwLock::new(None)),
        }
    }

    pub fn module(&self) -> Arc<ModuleMetadata> {
        Arc::clone(&self.module.read().unwrap_or_else(|p| p.into_inner()))
    }

    pub fn set_module(&self, name: &str) -> Result<(), Box<dyn std::error::Error>> {
        let module = self.workspace.module(Some(name))?;
        *self.module.write().unwrap_or_else(|p| p.into_inner()) = module;
        Ok(())
    }

    pub fn current_prefix(&self) -> Option<String> {
        self.current_prefix
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn set_current_prefix(&self, prefix: Option<String>) {
        let prefix = prefix.filter(|p| !p.is_empty());
        *self.current_prefix.write().unwrap_or_else(|p| p.into_inner()) = prefix;
    }

    /// Resolves a key typed in the shell against the current prefix.
    ///
    /// `/a.b` is absolute, `..` is the parent of the prefix, anything else
    /// is appended to the prefix.
    pub fn resolve_key(&self, target: &str) -> String {
        if let Some(absolute) = target.strip_prefix('/') {
            return absolute.to_string();
        }
        let current = self.current_prefix().unwrap_or_default();
        if target == ".." {
            return current
                .rsplit_once('.')
                .map(|(parent, _)| parent.to_string())
                .unwrap_or_default();
        }
        match (current.is_empty(), target.is_empty()) {
            (true, _) => target.to_string(),
            (false, true) => current,
            (false, false) => format!("{}.{}", current, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> (tempfile::TempDir, ShellContext, tokio::runtime::Runtime) {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("meta.json");
        std::fs::write(&file, r#"{"properties": [{"name": "server.port"}]}"#).unwrap();
        let workspace = Arc::new(Workspace::from_sources(&[file], &[]).unwrap());
        let module = workspace.module(None).unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ctx = ShellContext::new(workspace, module, rt.handle().clone());
        (temp, ctx, rt)
    }

    #[test]
    fn test_resolve_key() {
        let (_temp, ctx, _rt) = context();
        assert_eq!(ctx.resolve_key("server.port"), "server.port");

        ctx.set_current_prefix(Some("server.ssl".into()));
        assert_eq!(ctx.resolve_key("enabled"), "server.ssl.enabled");
        assert_eq!(ctx.resolve_key(""), "server.ssl");
        assert_eq!(ctx.resolve_key(".."), "server");
        assert_eq!(ctx.resolve_key("/spring.main"), "spring.main");

        ctx.set_current_prefix(Some(String::new()));
        assert_eq!(ctx.current_prefix(), None);
    }

    #[test]
    fn test_switch_module() {
        let (_temp, ctx, _rt) = context();
        assert!(ctx.set_module("default").is_ok());
        assert!(ctx.set_module("missing").is_err());
        assert_eq!(ctx.module().name(), "default");
    }
}
