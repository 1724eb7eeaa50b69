mod config;
mod db;
mod dtos;
mod error;
mod extract;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use db::db::{DBClient, MarketStore};
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};

use service::{
    job_service::JobService,
    pricing::PricingEngine,
    stats_service::StatsService,
    worker_service::WorkerService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn MarketStore>,
    // Services
    pub job_service: Arc<JobService>,
    pub worker_service: Arc<WorkerService>,
    pub stats_service: Arc<StatsService>,
}

impl AppState {
    pub fn new(db_client: Arc<dyn MarketStore>, config: Config) -> Self {
        let pricing = PricingEngine::new(config.price_default_rate, config.pricing_strict);

        let job_service = Arc::new(JobService::new(
            db_client.clone(),
            pricing,
            config.cancel_lead_hours,
        ));
        let worker_service = Arc::new(WorkerService::new(db_client.clone()));
        let stats_service = Arc::new(StatsService::new(db_client.clone()));

        Self {
            env: config,
            db_client,
            job_service,
            worker_service,
            stats_service,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = Config::init();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let pool = match PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!(
                "connected to the database (max {} connections)",
                config.db_max_connections
            );
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client: Arc<dyn MarketStore> = Arc::new(DBClient::new(pool));
    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if let Err(err) = app_state.worker_service.bootstrap_admin(email, password).await {
            tracing::error!("failed to create bootstrap admin: {}", err);
        }
    }

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app = create_router(app_state).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", err);
    }
}
