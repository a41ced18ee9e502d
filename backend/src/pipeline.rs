use crate::error::{InferenceError, PipelineError};
use crate::inference::{Classifier, RiskLabel};
use crate::record::{FeatureRecord, RawFields};
use crate::schema::FeatureSchema;
use log::debug;

/// Outcome of one prediction request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub label: RiskLabel,
    /// Positive-class probability in [0, 1].
    pub probability: f64,
}

impl PredictionResult {
    /// Probability as a percentage rounded to two decimals.
    pub fn probability_percent(&self) -> f64 {
        round_two_decimals(self.probability * 100.0)
    }

    /// e.g. `"43.21%"`, `"87.0%"`.
    pub fn probability_display(&self) -> String {
        format_percent(self.probability_percent())
    }
}

/// Rounds on the exact decimal expansion of `x`, ties to the even digit.
fn round_two_decimals(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    // 1100 fractional digits cover the full expansion of any f64.
    let exact = format!("{:.1100}", x.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (kept, rest) = frac.split_at(2.min(frac.len()));

    let digits = format!("{int_part}{kept:0<2}");
    let Ok(mut scaled) = digits.parse::<u128>() else {
        return x;
    };

    let mut rest = rest.bytes();
    let round_up = match rest.next() {
        Some(d) if d > b'5' => true,
        Some(b'5') => rest.any(|d| d != b'0') || scaled % 2 == 1,
        _ => false,
    };
    if round_up {
        scaled += 1;
    }
    (scaled as f64 / 100.0).copysign(x)
}

fn format_percent(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{percent:.1}%")
    } else {
        format!("{percent}%")
    }
}

/// Validates `raw_fields` against the schema, builds the ordered record and
/// scores it. Label and probability come from the same record.
pub fn run_prediction(
    raw_fields: &RawFields,
    schema: &FeatureSchema,
    model: &dyn Classifier,
) -> Result<PredictionResult, PipelineError> {
    let record = FeatureRecord::assemble(raw_fields, schema)?;

    let label = model.predict(&record)?;
    let probability = model.predict_probability(&record)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(InferenceError::ProbabilityOutOfRange(probability).into());
    }

    debug!(
        "Prediction: {} (p={probability:.4})",
        label.display_name()
    );
    Ok(PredictionResult { label, probability })
}
