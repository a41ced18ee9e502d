use crate::inference::RiskLabel;
use crate::pipeline::PredictionResult;
use crate::recommendation::{self, RecommendationBundle};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub at_risk: bool,
    pub label: RiskLabel,
    pub label_text: &'static str,
    pub probability: f64,
    pub probability_percent: f64,
    pub probability_display: String,
    pub recommendation: &'static RecommendationBundle,
    pub timestamp: String,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        PredictionResponse {
            at_risk: result.label.is_at_risk(),
            label: result.label,
            label_text: result.label.display_name(),
            probability: result.probability,
            probability_percent: result.probability_percent(),
            probability_display: result.probability_display(),
            recommendation: recommendation::for_label(result.label),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn timed(mut self, elapsed_ms: u64) -> Self {
        self.execution_time_ms = Some(elapsed_ms);
        self
    }
}
