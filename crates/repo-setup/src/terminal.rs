//! The operator-facing [`Console`] used by the binary.
//!
//! On a terminal, questions go through `dialoguer` and the summary is rendered
//! with the styled key/value printer. When stdin or stdout is not a terminal
//! (piped answers, CI), plain line-based I/O is used instead.

use std::io::{self, IsTerminal, StdinLock, Stdout};

use dialoguer::Input;

use repo_setup_core::error::{Result, SetupError};
use repo_setup_core::project::{Console, Field, LineConsole, ProjectInfo};

use crate::output;

pub enum TerminalConsole {
    Interactive,
    Piped(LineConsole<StdinLock<'static>, Stdout>),
}

impl TerminalConsole {
    /// Pick the interactive or piped mode for the process's stdio.
    pub fn stdio() -> Self {
        if io::stdin().is_terminal() && console::Term::stdout().is_term() {
            Self::Interactive
        } else {
            Self::Piped(LineConsole::new(io::stdin().lock(), io::stdout()))
        }
    }
}

impl Console for TerminalConsole {
    fn ask(&mut self, question: &str) -> Result<String> {
        match self {
            Self::Interactive => Input::<String>::new()
                .with_prompt(question)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| SetupError::Console(io::Error::other(e))),
            Self::Piped(lines) => lines.ask(question),
        }
    }

    fn say(&mut self, text: &str) {
        match self {
            Self::Interactive => println!("{text}"),
            Self::Piped(lines) => lines.say(text),
        }
    }

    fn show_summary(&mut self, info: &ProjectInfo) {
        match self {
            Self::Interactive => {
                output::print_header("Summary");
                for field in Field::ALL {
                    output::print_key_value(field.label(), info.get(field));
                }
                println!();
            }
            Self::Piped(lines) => lines.show_summary(info),
        }
    }
}
