use std::path::PathBuf;
use thiserror::Error;

/// The feature schema resource is absent or malformed.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("feature schema '{path}' could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("feature schema is not a JSON list of strings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("feature schema lists no features")]
    Empty,
    #[error("feature schema contains a blank feature name at position {0}")]
    BlankName(usize),
    #[error("feature '{0}' appears more than once in the schema")]
    DuplicateFeature(String),
}

/// The model artifact is absent, corrupted or not usable by this runtime.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model artifact '{path}' could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("model artifact is incompatible: {0}")]
    Incompatible(String),
}

/// A single scoring call could not be carried out on the given record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("record has {found} features, the model expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("feature '{feature}' must be {expected}")]
    TypeMismatch {
        feature: String,
        expected: &'static str,
    },
    #[error("feature '{feature}' has value '{value}' which the model was not fitted on")]
    UnknownCategory { feature: String, value: String },
    #[error("feature '{feature}' is not a finite number")]
    NonFinite { feature: String },
    #[error("model returned probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(f64),
}

/// Failure of one prediction request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("unexpected field(s): {}", .0.join(", "))]
    UnknownFields(Vec<String>),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Fatal errors while bringing the service up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Model(#[from] ModelLoadError),
}
