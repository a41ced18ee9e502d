//! Burnout risk prediction service.
//!
//! Raw survey answers are checked against the feature schema, laid out in
//! schema order and scored by a pre-trained classifier. The resulting label
//! selects one of two static recommendation bundles.

pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod rate_limit;
pub mod recommendation;
pub mod record;
pub mod routes;
pub mod schema;
pub mod survey;

pub use error::{InferenceError, ModelLoadError, PipelineError, SchemaError, StartupError};
pub use inference::{load_model, Classifier, ModelArtifact, RiskLabel};
pub use pipeline::{run_prediction, PredictionResult};
pub use record::{FeatureRecord, FeatureValue, RawFields};
pub use schema::{load_schema, FeatureSchema};
