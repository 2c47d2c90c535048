//! Error taxonomy for the drive lifecycle.
//!
//! Three classes matter to callers: configuration errors (raised before any
//! filesystem or process side effect), execution errors (engine launch or
//! exit failures, artifacts retained on disk), and ingestion errors (engine
//! ran but its output could not be adopted). `DriveError::kind` exposes the
//! classification so callers can branch without matching every variant.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`DriveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid options, disallowed attributes, unsupported evolvers.
    /// No filesystem or process side effect has occurred.
    Configuration,

    /// Engine subprocess could not be launched or exited non-zero.
    /// Run artifacts are retained for inspection.
    Execution,

    /// Engine ran successfully but its output is missing or malformed.
    /// The drive counter has not been advanced.
    Ingestion,
}

/// Errors produced while driving a system through the external engine.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Attribute not in the driver variant's allow-list.
    #[error("{driver} does not accept attribute '{attribute}'")]
    UnknownAttribute { driver: &'static str, attribute: String },

    /// An option value failed validation.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A required option is absent.
    #[error("missing option: {0}")]
    MissingOption(String),

    /// The driver variant does not support the configured evolver.
    #[error("unsupported evolver: {0}")]
    UnsupportedEvolver(String),

    /// A dynamics term kind appeared more than once on one system.
    #[error("duplicate dynamics term: {0}")]
    DuplicateDynamicsTerm(&'static str),

    /// A script fragment referenced a name not defined earlier in the
    /// document.
    #[error("script references undefined name ':{0}'")]
    UndefinedReference(String),

    /// Engine subprocess could not be spawned.
    #[error("failed to launch engine '{program}': {source}")]
    EngineLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Engine exited with a non-zero status.
    #[error("engine exited with code {code}: {stderr}")]
    EngineFailed { code: i32, stderr: String },

    /// Engine did not finish within the configured timeout.
    #[error("engine timed out after {0} seconds")]
    EngineTimeout(u64),

    /// An expected engine output artifact was not found.
    #[error("expected output missing: {0}")]
    MissingOutput(PathBuf),

    /// An engine output artifact could not be parsed.
    #[error("malformed output in {path}: {reason}")]
    MalformedOutput { path: PathBuf, reason: String },

    /// Filesystem error while writing run artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriveError {
    /// Classify this error into the drive taxonomy.
    ///
    /// Output readers map their own io failures to `MissingOutput` or
    /// `MalformedOutput`, so a raw `Io`/`Json` only arises while writing
    /// run artifacts before the engine runs and counts as execution.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriveError::UnknownAttribute { .. }
            | DriveError::InvalidOption(_)
            | DriveError::MissingOption(_)
            | DriveError::UnsupportedEvolver(_)
            | DriveError::DuplicateDynamicsTerm(_)
            | DriveError::UndefinedReference(_) => ErrorKind::Configuration,
            DriveError::EngineLaunch { .. }
            | DriveError::EngineFailed { .. }
            | DriveError::EngineTimeout(_)
            | DriveError::Io(_)
            | DriveError::Json(_) => ErrorKind::Execution,
            DriveError::MissingOutput(_) | DriveError::MalformedOutput { .. } => {
                ErrorKind::Ingestion
            }
        }
    }
}

/// Result type for drive operations.
pub type Result<T> = std::result::Result<T, DriveError>;
