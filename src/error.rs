//! Error type shared by the pipeline and its configuration/replay parsers.

use thiserror::Error;

/// Errors surfaced by the gesture pipeline.
///
/// Missing landmarks are not errors; they are a neutral input handled by
/// the session.  Everything here indicates a wiring bug or malformed input
/// data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// A vector filter was fed a sample of the wrong arity.
    #[error("expected {expected} components, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// An s-expression could not be parsed.
    #[error("malformed s-expression: {0}")]
    Parse(String),
    /// A plist key carried a value of the wrong type or range.
    #[error("invalid value for :{key}: {reason}")]
    InvalidValue { key: String, reason: String },
    /// A required plist key was absent.
    #[error("missing field :{0}")]
    MissingField(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
