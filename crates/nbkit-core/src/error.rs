//! Error types for nbkit-core.

use thiserror::Error;

/// Result type for nbkit-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nbkit-core.
#[derive(Debug, Error)]
pub enum Error {
    /// The notebook backing the current session could not be located.
    #[error("unable to find the notebook for the current session")]
    NotebookNotFound,

    /// Session lookup failed before a notebook could be located.
    #[error("session lookup failed: {0}")]
    Session(String),

    /// The notebook could not be read or parsed.
    #[error(transparent)]
    Notebook(#[from] nbkit_ipynb::IpynbError),

    /// The script interpreter could not be found.
    #[error("interpreter not found: {0}")]
    InterpreterNotFound(String),

    /// The runner binary could not be found.
    #[error("runner not found: {0}")]
    RunnerNotFound(String),

    /// Starting the background process failed.
    #[error("launch failed: {0}")]
    Launch(String),

    /// IPC communication error with the runner process.
    #[error("IPC error: {0}")]
    Ipc(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The cell text does not start with a `%%command` line.
    #[error("not a cell command: {0}")]
    NotACellCommand(String),

    /// No command with this name is registered.
    #[error("unknown cell command `%%{name}` (available: {available})")]
    UnknownCommand { name: String, available: String },
}

impl Error {
    /// A recovery hint for the user, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotebookNotFound => Some(
                "Save the notebook and make sure its server is running, or pass the notebook path explicitly.",
            ),
            Self::InterpreterNotFound(_) => {
                Some("Set NBKIT_INTERPRETER or pass --interpreter with a program on PATH.")
            }
            Self::RunnerNotFound(_) => {
                Some("Set NBKIT_RUNNER_PATH or install nbkit-runner next to nbkit.")
            }
            Self::NotACellCommand(_) => Some("The first line of the cell must look like `%%background`."),
            _ => None,
        }
    }

    /// The error message followed by its hint, if any.
    pub fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }
}
