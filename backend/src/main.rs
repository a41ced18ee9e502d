use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use burnout_backend::config::ServerConfig;
use burnout_backend::error::StartupError;
use burnout_backend::inference::{load_model, Classifier};
use burnout_backend::rate_limit::RateLimiter;
use burnout_backend::routes::{self, AppState};
use burnout_backend::schema::load_schema;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

const PURGE_INTERVAL: Duration = Duration::from_secs(300);

fn load_resources(config: &ServerConfig) -> Result<AppState, StartupError> {
    let schema = load_schema(&config.features_path)?;
    let model = load_model(&config.model_path)?;
    model.check_schema(&schema)?;

    let model: Arc<dyn Classifier> = model;
    Ok(AppState {
        schema,
        model,
        limiter: RateLimiter::per_minute(config.rate_limit_per_minute),
    })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting burnout risk prediction API");

    let config = ServerConfig::from_env();
    debug!("Configuration: {config:?}");

    // No partial startup: without schema and model every answer would be wrong.
    let state = match load_resources(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup aborted: {e}");
            return Err(e).context("loading feature schema and model artifact");
        }
    };
    info!(
        "Model ready: {} features, estimator {}",
        state.schema.len(),
        state.model.describe().estimator
    );

    let state = web::Data::new(state);
    let bind_address = config.bind_address();

    let purge_state = state.clone();
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = purge_state.limiter.purge_expired();
            if purged > 0 {
                debug!("Purged {purged} idle rate-limit entries");
            }
        }
    });

    info!("Listening on http://{bind_address} with {} workers", config.workers);
    info!("   GET  /api/health      - liveness");
    info!("   GET  /api/model-info  - model metadata");
    info!("   GET  /api/form        - survey fields");
    info!("   POST /api/predict     - burnout risk prediction");

    let origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("binding {bind_address}"))?
    .run()
    .await?;

    Ok(())
}
