pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod network;
pub mod process;
pub mod safety;
pub mod scenarios;
pub mod shell;
pub mod tasks;
pub mod terminal;
pub mod validator;
pub mod vfs;
pub mod web;

pub use commands::Profile;
pub use config::TerminalConfig;
pub use context::CommandContext;
pub use error::{Error, FsError};
pub use terminal::{CommandHistoryEntry, SessionObserver, SessionReport, Terminal, TerminalView};
pub use web::WebTerminal;
