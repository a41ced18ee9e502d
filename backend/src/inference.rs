use crate::error::{InferenceError, ModelLoadError};
use crate::record::{FeatureRecord, FeatureValue};
use crate::schema::FeatureSchema;
use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const FORMAT_VERSION: u32 = 1;

static MODEL: OnceCell<Arc<ModelArtifact>> = OnceCell::new();

/// Binary burnout risk flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    NotAtRisk,
    AtRisk,
}

impl RiskLabel {
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(Self::NotAtRisk),
            1 => Some(Self::AtRisk),
            _ => None,
        }
    }

    pub fn is_at_risk(self) -> bool {
        self == Self::AtRisk
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::NotAtRisk => "Not at Risk",
            Self::AtRisk => "At Risk",
        }
    }
}

/// Scoring capability over a single ordered record.
pub trait Classifier: Send + Sync {
    fn predict(&self, record: &FeatureRecord) -> Result<RiskLabel, InferenceError>;

    /// Probability of the positive ("at risk") class.
    fn predict_probability(&self, record: &FeatureRecord) -> Result<f64, InferenceError>;

    fn describe(&self) -> ModelInfo;
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub version: String,
    pub estimator: String,
    pub threshold: f64,
    pub features: Vec<String>,
}

/// How one input column is turned into model inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Encoder {
    Numeric,
    /// One indicator per category, in the listed order.
    OneHot { categories: Vec<String> },
}

impl Encoder {
    fn width(&self) -> usize {
        match self {
            Self::Numeric => 1,
            Self::OneHot { categories } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub encoder: Encoder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walks from the root; `x <= threshold` goes left.
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn validate(&self, tree_idx: usize, width: usize) -> Result<(), ModelLoadError> {
        if self.nodes.is_empty() {
            return Err(ModelLoadError::Incompatible(format!("tree {tree_idx} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(ModelLoadError::Incompatible(format!(
                        "tree {tree_idx} node {i} has a non-finite leaf value"
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(ModelLoadError::Incompatible(format!(
                            "tree {tree_idx} node {i} splits on input {feature}, encoded width is {width}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelLoadError::Incompatible(format!(
                            "tree {tree_idx} node {i} has a non-finite threshold"
                        )));
                    }
                    // Children must point forward so evaluation always terminates.
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(ModelLoadError::Incompatible(format!(
                                "tree {tree_idx} node {i} has invalid child index {child}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    GradientBoosting {
        init_score: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    },
    Logistic {
        intercept: f64,
        weights: Vec<f64>,
    },
}

impl Estimator {
    fn name(&self) -> &'static str {
        match self {
            Self::GradientBoosting { .. } => "gradient_boosting",
            Self::Logistic { .. } => "logistic",
        }
    }

    fn decision_function(&self, x: &[f64]) -> f64 {
        match self {
            Self::GradientBoosting {
                init_score,
                learning_rate,
                trees,
            } => init_score + learning_rate * trees.iter().map(|t| t.evaluate(x)).sum::<f64>(),
            Self::Logistic { intercept, weights } => {
                intercept + weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
            }
        }
    }

    fn validate(&self, width: usize) -> Result<(), ModelLoadError> {
        match self {
            Self::GradientBoosting {
                init_score,
                learning_rate,
                trees,
            } => {
                if !init_score.is_finite() || !learning_rate.is_finite() {
                    return Err(ModelLoadError::Incompatible(
                        "non-finite boosting parameters".to_string(),
                    ));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(i, width)?;
                }
            }
            Self::Logistic { intercept, weights } => {
                if weights.len() != width {
                    return Err(ModelLoadError::Incompatible(format!(
                        "{} weights for an encoded width of {width}",
                        weights.len()
                    )));
                }
                if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                    return Err(ModelLoadError::Incompatible(
                        "non-finite logistic coefficients".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Pre-trained classifier exported from the fitted preprocessing + estimator
/// pipeline. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_id: String,
    pub model_version: String,
    #[serde(default = "default_threshold")]
    pub decision_threshold: f64,
    pub columns: Vec<ColumnSpec>,
    pub estimator: Estimator,
}

fn default_threshold() -> f64 {
    0.5
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        if self.columns.is_empty() {
            return Err(ModelLoadError::Incompatible("artifact declares no columns".to_string()));
        }
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            return Err(ModelLoadError::Incompatible(format!(
                "decision threshold {} not in [0, 1]",
                self.decision_threshold
            )));
        }
        for column in &self.columns {
            if let Encoder::OneHot { categories } = &column.encoder {
                if categories.is_empty() {
                    return Err(ModelLoadError::Incompatible(format!(
                        "column '{}' has no categories",
                        column.name
                    )));
                }
            }
        }
        self.estimator.validate(self.encoded_width())
    }

    /// Only the column count is contractual; differing names are logged.
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<(), ModelLoadError> {
        if self.columns.len() != schema.len() {
            return Err(ModelLoadError::Incompatible(format!(
                "model expects {} columns, feature schema lists {}",
                self.columns.len(),
                schema.len()
            )));
        }
        for (i, (column, name)) in self.columns.iter().zip(schema.names()).enumerate() {
            if &column.name != name {
                warn!(
                    "Column {i}: model was fitted on '{}', schema names it '{name}'",
                    column.name
                );
            }
        }
        Ok(())
    }

    pub fn encoded_width(&self) -> usize {
        self.columns.iter().map(|c| c.encoder.width()).sum()
    }

    fn encode(&self, record: &FeatureRecord) -> Result<Vec<f64>, InferenceError> {
        if record.len() != self.columns.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.columns.len(),
                found: record.len(),
            });
        }

        let mut encoded = Vec::with_capacity(self.encoded_width());
        for (column, value) in self.columns.iter().zip(record.values()) {
            match (&column.encoder, value) {
                (Encoder::Numeric, FeatureValue::Number(v)) => {
                    if !v.is_finite() {
                        return Err(InferenceError::NonFinite {
                            feature: column.name.clone(),
                        });
                    }
                    encoded.push(*v);
                }
                (Encoder::OneHot { categories }, FeatureValue::Text(s)) => {
                    let hit = categories.iter().position(|c| c == s).ok_or_else(|| {
                        InferenceError::UnknownCategory {
                            feature: column.name.clone(),
                            value: s.clone(),
                        }
                    })?;
                    encoded.extend((0..categories.len()).map(|i| if i == hit { 1.0 } else { 0.0 }));
                }
                (Encoder::Numeric, FeatureValue::Text(_)) => {
                    return Err(InferenceError::TypeMismatch {
                        feature: column.name.clone(),
                        expected: "a number",
                    });
                }
                (Encoder::OneHot { .. }, FeatureValue::Number(_)) => {
                    return Err(InferenceError::TypeMismatch {
                        feature: column.name.clone(),
                        expected: "a category string",
                    });
                }
            }
        }
        Ok(encoded)
    }
}

impl Classifier for ModelArtifact {
    /// Ties at the threshold go to the negative class.
    fn predict(&self, record: &FeatureRecord) -> Result<RiskLabel, InferenceError> {
        let p = self.predict_probability(record)?;
        Ok(if p > self.decision_threshold {
            RiskLabel::AtRisk
        } else {
            RiskLabel::NotAtRisk
        })
    }

    fn predict_probability(&self, record: &FeatureRecord) -> Result<f64, InferenceError> {
        let x = self.encode(record)?;
        Ok(sigmoid(self.estimator.decision_function(&x)))
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            model_id: self.model_id.clone(),
            version: self.model_version.clone(),
            estimator: self.estimator.name().to_string(),
            threshold: self.decision_threshold,
            features: self.columns.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-700.0, 700.0);
    1.0 / (1.0 + (-z).exp())
}

/// Loads the model artifact once per process. Later calls return the cached
/// instance regardless of `path`; a failed load leaves the cache empty.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Arc<ModelArtifact>, ModelLoadError> {
    MODEL
        .get_or_try_init(|| {
            let model = ModelArtifact::load(path.as_ref())?;
            info!(
                "Model {} v{} loaded from {} ({}, {} encoded inputs)",
                model.model_id,
                model.model_version,
                path.as_ref().display(),
                model.estimator.name(),
                model.encoded_width()
            );
            Ok(Arc::new(model))
        })
        .cloned()
}
