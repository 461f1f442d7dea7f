//! Project metadata and the prompts that collect it.
//!
//! The whole conversation with the operator goes through a [`Console`] that
//! the caller owns and passes in, so the same flow runs on a terminal, on
//! piped stdin, or against a scripted transcript in tests.

use std::io::{self, BufRead, Write};

use crate::error::{Result, SetupError};

/// The literal answer that counts as "yes" (compared case-insensitively).
pub const AFFIRMATIVE: &str = "y";

/// Metadata for the generated project, as entered by the operator.
///
/// Answers are not validated; empty strings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub email: String,
    pub username: String,
    pub repository: String,
    pub project_name: String,
    pub short_description: String,
    pub long_description: String,
    pub docs_url: String,
}

/// One prompted field of [`ProjectInfo`], in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Username,
    Repository,
    ProjectName,
    ShortDescription,
    LongDescription,
    DocsUrl,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Email,
        Field::Username,
        Field::Repository,
        Field::ProjectName,
        Field::ShortDescription,
        Field::LongDescription,
        Field::DocsUrl,
    ];

    pub fn question(self) -> &'static str {
        match self {
            Self::Name => "What is your name?",
            Self::Email => "What is your email?",
            Self::Username => "What is your GitHub username?",
            Self::Repository => "What is the name of the repository?",
            Self::ProjectName => "What is the name of the project?",
            Self::ShortDescription => "Short description of the project:",
            Self::LongDescription => "Long description of the project:",
            Self::DocsUrl => "Documentation URL:",
        }
    }

    /// Label used in the confirmation summary.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Username => "Username",
            Self::Repository => "Repository",
            Self::ProjectName => "Project name",
            Self::ShortDescription => "Short description",
            Self::LongDescription => "Long description",
            Self::DocsUrl => "Docs URL",
        }
    }
}

impl ProjectInfo {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Username => &self.username,
            Field::Repository => &self.repository,
            Field::ProjectName => &self.project_name,
            Field::ShortDescription => &self.short_description,
            Field::LongDescription => &self.long_description,
            Field::DocsUrl => &self.docs_url,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Username => &mut self.username,
            Field::Repository => &mut self.repository,
            Field::ProjectName => &mut self.project_name,
            Field::ShortDescription => &mut self.short_description,
            Field::LongDescription => &mut self.long_description,
            Field::DocsUrl => &mut self.docs_url,
        }
    }

    /// `username/repository`, the GitHub slug of the new project.
    pub fn repository_slug(&self) -> String {
        format!("{}/{}", self.username, self.repository)
    }
}

/// A blocking question/answer channel to the operator.
pub trait Console {
    /// Show `question` and block until one line of input is available.
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Show a line of text.
    fn say(&mut self, text: &str);

    /// Show the collected answers before confirmation.
    fn show_summary(&mut self, info: &ProjectInfo) {
        self.say("");
        for field in Field::ALL {
            self.say(&format!("{}: {}", field.label(), info.get(field)));
        }
        self.say("");
    }
}

/// A [`Console`] over any line reader and writer (stdin/stdout, or buffers).
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question} ").map_err(SetupError::Console)?;
        self.output.flush().map_err(SetupError::Console)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(SetupError::Console)?;
        if read == 0 {
            return Err(SetupError::Console(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            )));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn say(&mut self, text: &str) {
        // Output is best-effort; a closed stdout must not abort the run.
        let _ = writeln!(self.output, "{text}");
    }
}

/// Ask a yes/no question; only the affirmative token counts as yes.
pub fn ask_yes_no<C: Console + ?Sized>(console: &mut C, question: &str) -> Result<bool> {
    let answer = console.ask(&format!("{question} ({AFFIRMATIVE}/n)"))?;
    Ok(is_affirmative(&answer))
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(AFFIRMATIVE)
}

/// Ask every question in [`Field::ALL`] order, show the summary, and ask for
/// confirmation.
///
/// If the operator does not confirm, `on_abort` runs once and
/// [`SetupError::Aborted`] is returned; no `ProjectInfo` escapes.
pub fn collect_project_info<C, F>(console: &mut C, on_abort: F) -> Result<ProjectInfo>
where
    C: Console + ?Sized,
    F: FnOnce(),
{
    let mut info = ProjectInfo::default();
    for field in Field::ALL {
        *info.field_mut(field) = console.ask(field.question())?;
    }

    console.show_summary(&info);

    if !ask_yes_no(console, "Is this correct?")? {
        on_abort();
        return Err(SetupError::Aborted);
    }

    tracing::debug!(project = %info.project_name, "project info confirmed");
    Ok(info)
}
