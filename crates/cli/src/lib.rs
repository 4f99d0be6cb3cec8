mod commands;
mod shell;
mod view;

use clap::{Parser, Subcommand};
use keyscope_runtime::Workspace;
use keyscope_runtime::config::DESCRIPTOR_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "keyscope",
    version,
    about = "Completion and validation for Spring Boot configuration keys",
    long_about = "Keyscope indexes the configuration metadata shipped in build output directories \
                  and dependency JARs, and answers lookup, completion and validation queries \
                  for application.properties and application.yml keys."
)]
pub struct Cli {
    /// Workspace descriptor. Defaults to ./keyscope.json when present.
    #[arg(long, global = true, value_name = "FILE")]
    pub workspace: Option<PathBuf>,

    /// Metadata file to index directly (repeatable, first wins). Replaces the descriptor.
    #[arg(long = "source", global = true, value_name = "FILE")]
    pub sources: Vec<PathBuf>,

    /// Class descriptor file used with --source (repeatable).
    #[arg(long = "types", global = true, value_name = "FILE")]
    pub type_descriptors: Vec<PathBuf>,

    /// Module to query. Defaults to the first module of the workspace.
    #[arg(long, global = true)]
    pub module: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show group, property and hint counts per metadata source
    Stats,
    /// Show what is declared under a name
    Lookup {
        /// Key in any spelling (dotted, dashed, camel case)
        name: String,
        /// Print the declaration as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest keys below a parent
    Complete {
        /// Fully typed parent key; empty for the top level
        #[arg(default_value = "")]
        parent: String,
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
    /// Validate keys; exits with an error when any key is unknown
    Check {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Start an interactive shell with key completion
    Shell,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The shell owns the terminal; keep its logs in the file only.
    let to_stderr = !matches!(cli.command, Commands::Shell);
    let _guard = keyscope_runtime::init_logging("cli", to_stderr);

    let rt = tokio::runtime::Runtime::new()?;
    let workspace = open_workspace(&cli)?;
    let module = workspace.module(cli.module.as_deref())?;

    match cli.command {
        Commands::Stats => commands::stats(&workspace),
        Commands::Lookup { name, json } => commands::lookup(&module, &name, json),
        Commands::Complete { parent, query } => commands::complete(&module, &parent, &query),
        Commands::Values { property, query } => commands::values(&module, &property, &query),
        Commands::Check { keys } => commands::check(&module, &keys),
        Commands::Shell => shell::run(workspace, module, rt.handle().clone()),
    }
}

fn open_workspace(cli: &Cli) -> Result<Workspace, Box<dyn std::error::Error>> {
    if !cli.sources.is_empty() {
        return Ok(Workspace::from_sources(&cli.sources, &cli.type_descriptors)?);
    }
    let descriptor = match &cli.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir()?.join(DESCRIPTOR_FILE),
    };
    if !descriptor.is_file() {
        return Err(format!(
            "no workspace descriptor at {}; pass --workspace or --source",
            descriptor.display()
        )
        .into());
    }
    Ok(Workspace::load(&descriptor)?)
}
