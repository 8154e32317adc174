use std::{fmt, path::PathBuf};

use thiserror::Error;

use simcore_shared::{EntityError, RegistryError, ScriptError, StateError};

/// The comparison that detected two replicas diverging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesyncPhase {
    /// A freshly deserialized replica did not reproduce the state it was
    /// given.
    Deserialization,
    /// Replicas starting from the same state disagreed after running the
    /// same turn.
    TurnExecution,
    /// The rejoined replica disagreed with the primary after a turn.
    Rejoin,
}

impl fmt::Display for DesyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesyncPhase::Deserialization => write!(f, "deserialization"),
            DesyncPhase::TurnExecution => write!(f, "turn execution"),
            DesyncPhase::Rejoin => write!(f, "rejoin"),
        }
    }
}

/// Errors reported by the virtual file system
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("File '{path}' does not exist")]
    NotFound { path: String },

    #[error("Failed to read '{path}': {message}")]
    ReadFailed { path: String, message: String },

    #[error("Directory '{directory}' could not be listed")]
    DirectoryNotFound { directory: String },
}

/// Error type for wall clock reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("System time is before UNIX epoch")]
    SystemTimeBeforeEpoch,
}

/// Errors that can occur while driving a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Two replicas that must be identical diverged. Diagnostics have been
    /// written to `dump_dir`.
    #[error("Simulation replicas diverged during {phase}; diagnostics written to {dump_dir:?}")]
    Desync { phase: DesyncPhase, dump_dir: PathBuf },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Script '{path}' is not valid UTF-8")]
    InvalidScriptEncoding { path: String },

    #[error("Failed to build a simulation replica: {message}")]
    ReplicaCreation { message: String },

    #[error("Load task '{description}' failed: {message}")]
    LoadTaskFailed { description: String, message: String },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error(transparent)]
    Time(#[from] TimeError),
}
