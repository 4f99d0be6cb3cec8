use super::context::ShellContext;
use crate::commands::{check_keys, describe};
use crate::view::{SuggestionView, ValueView};
use clap::Parser;
use clap::error::ErrorKind;
use tabled::{Table, settings::Style};
use tokio_util::sync::CancellationToken;

/// Helper struct for Clap parsing within the shell
#[derive(Parser, Clone, Debug)]
#[command(no_binary_name = true)]
pub enum ShellCommand {
    /// Show what is declared under a key
    Lookup {
        /// Key, relative to the current prefix unless it starts with '/'
        name: String,
    },
    /// Suggest keys below a parent
    Complete {
        /// Parent key (defaults to the current prefix)
        parent: Option<String>,
        /// Partially typed continuation
        #[arg(default_value = "")]
        query: String,
    },
    /// Suggest values for a key
    Values {
        property: String,
        #[arg(default_value = "")]
        query: String,
    },
    /// Validate keys
    Check {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Change the current key prefix
    Cd {
        /// Target prefix; '/' goes back to the top level
        path: String,
    },
    /// Print the current key prefix
    Pwd,
    /// Switch module, or list modules when no name is given
    Module { name: Option<String> },
    /// Revalidate every metadata source and re-enumerate modules
    Reload,
    /// Clear the screen
    Clear,
}

impl ShellCommand {
    /// Automatically generates the list of available command names from the enum.
    pub fn command_names() -> Vec<String> {
        use clap::CommandFactory;
        let cmd = Self::command();
        let mut names = vec!["help".to_string(), "exit".to_string(), "quit".to_string()];
        names.extend(cmd.get_subcommands().map(|s| s.get_name().to_string()));
        names
    }

    pub fn execute(&self, context: &ShellContext) -> Result<String, Box<dyn std::error::Error>> {
        let module = context.module();
        match self {
            ShellCommand::Lookup { name } => Ok(describe(&module, &context.resolve_key(name))),
            ShellCommand::Complete { parent, query } => {
                let parent = context.resolve_key(parent.as_deref().unwrap_or(""));
                let rows: Vec<SuggestionView> = module
                    .suggest_keys(&parent, query)
                    .iter()
                    .map(SuggestionView::from_suggestion)
                    .collect();
                Ok(render(rows))
            }
            ShellCommand::Values { property, query } => {
                let rows: Vec<ValueView> = module
                    .suggest_values(&context.resolve_key(property), query)
                    .iter()
                    .map(ValueView::from_value)
                    .collect();
                Ok(render(rows))
            }
            ShellCommand::Check { keys } => {
                let keys: Vec<String> = keys.iter().map(|k| context.resolve_key(k)).collect();
                let (out, _) = check_keys(&module, &keys);
                Ok(out)
            }
            ShellCommand::Cd { path } => {
                let target = if path == "/" {
                    String::new()
                } else {
                    context.resolve_key(path)
                };
                context.set_current_prefix(Some(target));
                Ok(String::new())
            }
            ShellCommand::Pwd => Ok(context.current_prefix().unwrap_or_else(|| "/".to_string())),
            ShellCommand::Module { name: Some(name) } => {
                context.set_module(name)?;
                context.set_current_prefix(None);
                Ok(format!("Switched to module {}", name))
            }
            ShellCommand::Module { name: None } => {
                let current = module.name().to_string();
                let lines: Vec<String> = context
                    .workspace
                    .module_names()
                    .map(|n| if n == current { format!("* {}", n) } else { format!("  {}", n) })
                    .collect();
                Ok(lines.join("\n"))
            }
            ShellCommand::Reload => {
                let report = context
                    .rt_handle
                    .block_on(context.workspace.refresh_sources(CancellationToken::new()))?;
                let republished = context.workspace.refresh_modules();
                let mut out = format!(
                    "{} reloaded, {} unchanged, {} evicted, {} failed; {} module index(es) rebuilt",
                    report.reloaded.len(),
                    report.unchanged.len(),
                    report.evicted.len(),
                    report.failed.len(),
                    republished
                );
                for (source, message) in &report.failed {
                    out.push_str(&format!("\n  {}: {}", source, message));
                }
                Ok(out)
            }
            ShellCommand::Clear => Ok(String::new()),
        }
    }
}

fn render<T: tabled::Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "NO RECORDS FOUND".to_string();
    }
    Table::new(rows).with(Style::psql()).to_string()
}

pub fn parse_shell_command(
    input: &str,
) -> Result<Option<ShellCommand>, Box<dyn std::error::Error>> {
    // Use shlex to split arguments while respecting quotes
    let args = shlex::split(input).ok_or("Invalid quoting")?;

    // Parse using Clap
    match ShellCommand::try_parse_from(args) {
        Ok(c) => Ok(Some(c)),
        Err(e) => {
            // Handle help/version display without returning an error
            if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion {
                println!("{}", e);
                return Ok(None);
            }
            Err(Box::new(e))
        }
    }
}
