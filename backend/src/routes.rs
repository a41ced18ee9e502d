use crate::error::PipelineError;
use crate::inference::Classifier;
use crate::models::{ApiResponse, PredictionResponse};
use crate::pipeline::run_prediction;
use crate::rate_limit::RateLimiter;
use crate::record::RawFields;
use crate::schema::FeatureSchema;
use crate::survey::{self, FieldSpec};
use actix_web::{error::InternalError, web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Shared, read-only after startup apart from the rate-limit table.
pub struct AppState {
    pub schema: Arc<FeatureSchema>,
    pub model: Arc<dyn Classifier>,
    pub limiter: RateLimiter,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(64 * 1024)
            .error_handler(|err, _req| {
                let message = format!("Invalid request body: {err}");
                let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error(&message));
                InternalError::from_response(err, response).into()
            }),
    )
    .route("/api/health", web::get().to(health_check))
    .route("/api/model-info", web::get().to(model_info))
    .route("/api/form", web::get().to(form))
    .route("/api/predict", web::post().to(predict));
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("Endpoint not found"))
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("Burnout risk prediction API"))
}

async fn model_info(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(state.model.describe()))
}

async fn form() -> impl Responder {
    let fields: &'static [FieldSpec] = &survey::FIELDS;
    HttpResponse::Ok().json(ApiResponse::success(fields))
}

async fn predict(
    state: web::Data<AppState>,
    req: web::Json<RawFields>,
    request: HttpRequest,
) -> impl Responder {
    let start_time = Instant::now();
    let elapsed = || start_time.elapsed().as_millis() as u64;

    if let Some(client_ip) = request.peer_addr().map(|addr| addr.ip().to_string()) {
        if !state.limiter.check(&client_ip) {
            warn!("Rate limit exceeded for {client_ip}");
            return HttpResponse::TooManyRequests()
                .json(ApiResponse::<()>::error("Rate limit exceeded").timed(elapsed()));
        }
    }

    let raw = req.into_inner();
    if let Err(violations) = survey::validate(&raw) {
        let message = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        warn!("Rejected survey answers: {message}");
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error(&message).timed(elapsed()));
    }

    let schema = Arc::clone(&state.schema);
    let model = Arc::clone(&state.model);
    match web::block(move || run_prediction(&raw, &schema, model.as_ref())).await {
        Ok(Ok(result)) => {
            info!(
                "Prediction served: {} ({})",
                result.label.display_name(),
                result.probability_display()
            );
            HttpResponse::Ok()
                .json(ApiResponse::success(PredictionResponse::from(result)).timed(elapsed()))
        }
        Ok(Err(e @ (PipelineError::MissingFields(_) | PipelineError::UnknownFields(_)))) => {
            warn!("Rejected prediction request: {e}");
            HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error(&e.to_string()).timed(elapsed()))
        }
        Ok(Err(PipelineError::Inference(e))) => {
            warn!("Inference failed: {e}");
            HttpResponse::UnprocessableEntity().json(
                ApiResponse::<()>::error(&format!("Could not score this record, please re-submit: {e}"))
                    .timed(elapsed()),
            )
        }
        Err(e) => {
            error!("Blocking prediction task failed: {e}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Internal error").timed(elapsed()))
        }
    }
}
