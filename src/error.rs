use thiserror::Error;

/// Errors raised while building a terminal session.
///
/// Command failures never show up here; they are ordinary `CommandOutput`s
/// with a non-zero exit code.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid validator pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),
    #[error("{field} must be an absolute path, got `{value}`")]
    RelativePath { field: &'static str, value: String },
    #[error("scenario `{0}` defines no tasks")]
    EmptyScenario(String),
    #[error("home directory `{path}` cannot be created: {source}")]
    Home {
        path: String,
        #[source]
        source: FsError,
    },
    #[error("cwd `{0}` is not a directory")]
    Cwd(String),
    #[error("unknown log level `{0}`")]
    LogLevel(String),
}

/// Errors from the in-memory filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("not a directory")]
    NotADirectory,
    #[error("parent directory not found")]
    ParentNotFound,
    #[error("invalid path")]
    InvalidPath,
}
