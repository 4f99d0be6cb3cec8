mod command;
mod completer;
mod context;
mod highlighter;
mod prompt;

use keyscope_core::service::ModuleMetadata;
use keyscope_runtime::Workspace;
use reedline::{
    ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder,
    Reedline, ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use self::command::{ShellCommand, parse_shell_command};
use self::completer::KeyscopeCompleter;
use self::context::ShellContext;
use self::highlighter::KeyscopeHighlighter;
use self::prompt::DefaultPrompt;

// Shell configuration constants
const SHELL_HISTORY_SIZE: usize = 500;

pub struct ReplServer {
    context: ShellContext,
}

impl ReplServer {
    pub fn new(
        workspace: Arc<Workspace>,
        module: Arc<ModuleMetadata>,
        rt_handle: tokio::runtime::Handle,
    ) -> Self {
        Self {
            context: ShellContext::new(workspace, module, rt_handle),
        }
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let module = self.context.module();
        println!(
            "Module {}: {} metadata sources. Type 'help' for commands.",
            module.name(),
            module.sources().len()
        );

        let line_editor = self.setup_line_editor()?;
        self.run_loop(line_editor)
    }

    fn setup_line_editor(&self) -> Result<Reedline, Box<dyn std::error::Error>> {
        let commands = ShellCommand::command_names();

        let completer = Box::new(KeyscopeCompleter::new(
            commands.clone(),
            self.context.clone(),
        ));

        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let history = match history_file() {
            Some(path) => FileBackedHistory::with_file(SHELL_HISTORY_SIZE, path)
                .or_else(|e| {
                    warn!("History file unavailable: {}", e);
                    FileBackedHistory::new(SHELL_HISTORY_SIZE)
                })?,
            None => FileBackedHistory::new(SHELL_HISTORY_SIZE)?,
        };

        let highlighter = Box::new(KeyscopeHighlighter::new(commands));

        Ok(Reedline::create()
            .with_history(Box::new(history))
            .with_completer(completer)
            .with_highlighter(highlighter)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_hinter(Box::new(
                DefaultHinter::default().with_style(
                    nu_ansi_term::Style::new()
                        .italic()
                        .fg(nu_ansi_term::Color::LightGray),
                ),
            ))
            .with_edit_mode(Box::new(Emacs::new(keybindings))))
    }

    fn run_loop(&self, mut line_editor: Reedline) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let prompt = DefaultPrompt::new(
                self.context.module().name().to_string(),
                self.context.current_prefix(),
            );
            let sig = line_editor.read_line(&prompt);

            match sig {
                Ok(Signal::Success(buffer)) => {
                    let trimmed = buffer.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if trimmed == "exit" || trimmed == "quit" {
                        break;
                    }

                    match parse_shell_command(trimmed) {
                        Ok(Some(cmd)) => match cmd.execute(&self.context) {
                            Ok(output) => {
                                if !output.is_empty() {
                                    println!("{}", output);
                                }
                                if matches!(cmd, ShellCommand::Clear) {
                                    let _ = line_editor.clear_screen();
                                }
                            }
                            Err(e) => eprintln!("Error: {}", e),
                        },
                        Ok(None) => {} // Help or handled by Clap
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                    println!("Bye!");
                    break;
                }
                x => println!("Event: {:?}", x),
            }
        }
        Ok(())
    }
}

/// `$KEYSCOPE_HOME/shell/history`, defaulting to `~/.keyscope`.
fn history_file() -> Option<PathBuf> {
    let mut dir = match std::env::var_os("KEYSCOPE_HOME") {
        Some(home) => PathBuf::from(home),
        None => dirs::home_dir()?.join(".keyscope"),
    };
    dir.push("shell");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("history"))
}

pub fn run(
    workspace: Workspace,
    module: Arc<ModuleMetadata>,
    rt_handle: tokio::runtime::Handle,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = ReplServer::new(Arc::new(workspace), module, rt_handle);
    server.run()
}
