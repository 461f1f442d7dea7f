//! repo-setup: turn a freshly generated template repository into your project.
//!
//! Asks for the project metadata, fills in every `{{PLACEHOLDER}}` under
//! `template/`, moves the template tree into place, and configures (or
//! removes) the template-sync workflow. Run it once, from the repository root.

mod commands;
mod output;
mod terminal;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use repo_setup_core::error::SetupError;
use repo_setup_core::layout::Layout;

#[derive(Parser)]
#[command(
    name = "repo-setup",
    about = "Interactive setup for projects generated from a repository template",
    version
)]
struct Cli {
    /// Project root containing the `template/` directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON file overriding the default file layout
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // A declined confirmation has already been reported by the prompt.
            if !matches!(err.downcast_ref::<SetupError>(), Some(SetupError::Aborted)) {
                output::print_error(&format!("{err:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let layout = load_layout(cli.layout.as_deref())?;
    let mut console = terminal::TerminalConsole::stdio();
    commands::setup::run(&mut console, &cli.root, &layout).await
}

fn load_layout(path: Option<&Path>) -> anyhow::Result<Layout> {
    match path {
        Some(path) => Ok(Layout::load(path)?),
        None => Ok(Layout::default()),
    }
}
