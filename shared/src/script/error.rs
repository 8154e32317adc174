use thiserror::Error;

/// Failures reported by a [`ScriptRuntime`](super::ScriptRuntime).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Script function '{name}' is not defined")]
    MissingFunction { name: String },

    #[error("Script object has no method '{method}'")]
    MissingMethod { method: String },

    /// The script raised an exception or otherwise failed to evaluate
    #[error("Script error: {message}")]
    Exception { message: String },

    #[error("Script '{path}' could not be loaded: {message}")]
    LoadFailed { path: String, message: String },

    #[error("Unknown script constructor")]
    UnknownConstructor,

    #[error("Unknown script object")]
    UnknownObject,
}
