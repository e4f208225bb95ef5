//! Command dispatch for both terminal profiles.
//!
//! Each profile owns a closed enum of the commands it understands. The
//! dispatcher tokenises the line, looks the name up in that enum's table and
//! runs the variant's handler against the session's `CommandContext`.

pub mod lab;
pub mod scripted;

use crate::context::CommandContext;
use crate::error::FsError;
use crate::shell::tokenize;
use log::debug;
use serde::{Deserialize, Serialize};

pub use lab::LabCommand;
pub use scripted::ScriptedCommand;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 127;

/// Presentational styling for an output line. The validator engine never
/// looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Error,
    Success,
    Heading,
    Accent,
    Dir,
}

impl Tone {
    pub fn paint(self, text: &str) -> String {
        let code = match self {
            Tone::Plain => return text.to_string(),
            Tone::Error => "31",
            Tone::Success => "32",
            Tone::Heading => "33",
            Tone::Dir => "34",
            Tone::Accent => "36",
        };
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub tone: Tone,
}

impl Line {
    pub fn plain(text: impl Into<String>) -> Self {
        Line {
            text: text.into(),
            tone: Tone::Plain,
        }
    }
    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Line {
            text: text.into(),
            tone,
        }
    }
    pub fn render(&self) -> String {
        self.tone.paint(&self.text)
    }
}

/// Requests a handler makes of the terminal rather than of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Clear,
    ShowHint,
    ShowTasks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<Line>,
    pub exit_code: i32,
    pub action: Option<Action>,
}

impl Default for CommandOutput {
    fn default() -> Self {
        Self::ok()
    }
}

impl CommandOutput {
    pub fn ok() -> Self {
        CommandOutput {
            lines: Vec::new(),
            exit_code: EXIT_OK,
            action: None,
        }
    }

    pub fn text<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandOutput {
            lines: lines.into_iter().map(Line::plain).collect(),
            ..Self::ok()
        }
    }

    pub fn line(text: impl Into<String>) -> Self {
        Self::text([text])
    }

    pub fn failure(exit_code: i32, message: impl Into<String>) -> Self {
        CommandOutput {
            lines: vec![Line::toned(message, Tone::Error)],
            exit_code,
            action: None,
        }
    }

    pub fn action(action: Action) -> Self {
        CommandOutput {
            action: Some(action),
            ..Self::ok()
        }
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn success(&self) -> bool {
        self.exit_code == EXIT_OK
    }

    /// Output text without styling, as recorded in history entries.
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }
}

/// A closed set of commands with their handlers.
pub trait CommandSet: Copy + Sized + 'static {
    /// The dispatch table, fixed at compile time.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn run(self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput;

    fn lookup(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.name()).collect()
    }
}

/// Tokenise `line` and run it through the command set `C`.
pub fn dispatch<C: CommandSet>(line: &str, ctx: &mut CommandContext) -> CommandOutput {
    let Some((name, args)) = tokenize(line) else {
        return CommandOutput::ok();
    };
    match C::lookup(name) {
        Some(command) => {
            debug!("dispatch {} {:?}", name, args);
            command.run(&args, ctx)
        }
        None => {
            debug!("unknown command {}", name);
            CommandOutput::failure(EXIT_NOT_FOUND, format!("{}: command not found", name))
        }
    }
}

/// Which command set and fixtures a terminal instance uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Fixed narrative output for the scored TCS scenarios.
    #[default]
    Scripted,
    /// Commands backed by the simulated filesystem, used by the labs.
    Filesystem,
}

impl Profile {
    pub fn execute(self, line: &str, ctx: &mut CommandContext) -> CommandOutput {
        match self {
            Profile::Scripted => dispatch::<ScriptedCommand>(line, ctx),
            Profile::Filesystem => dispatch::<LabCommand>(line, ctx),
        }
    }

    pub fn command_names(self) -> Vec<&'static str> {
        match self {
            Profile::Scripted => ScriptedCommand::names(),
            Profile::Filesystem => LabCommand::names(),
        }
    }

    pub fn default_user(self) -> &'static str {
        match self {
            Profile::Scripted => "devops",
            Profile::Filesystem => "user",
        }
    }

    pub fn default_host(self) -> &'static str {
        match self {
            Profile::Scripted => "tcs",
            Profile::Filesystem => "devops",
        }
    }

    pub fn default_home(self) -> &'static str {
        match self {
            Profile::Scripted => "/home/devops",
            Profile::Filesystem => "/home/user",
        }
    }

    pub fn initial_context(self, user: &str, home: &str) -> Result<CommandContext, FsError> {
        match self {
            Profile::Scripted => CommandContext::scripted(user, home),
            Profile::Filesystem => CommandContext::lab(user, home),
        }
    }
}
