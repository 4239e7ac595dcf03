use crate::{
    daily_handler, dashboard_handler, forecast_handler, hourly_handler, TrendAccess, TrendData,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use meteo_trends_core::ArtifactStore;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

#[derive(Clone)]
pub struct AppState {
    pub static_dir: String,
    pub trends: Arc<dyn TrendData>,
    pub artifacts: Arc<ArtifactStore>,
}

pub async fn build_app_state(
    database: String,
    models_dir: String,
    static_dir: String,
) -> Result<AppState, anyhow::Error> {
    let trends = Arc::new(
        TrendAccess::new(&database)
            .await
            .map_err(|e| anyhow!("error opening trends database: {}", e))?,
    );
    let artifacts = Arc::new(ArtifactStore::new(models_dir));

    Ok(AppState {
        static_dir,
        trends,
        artifacts,
    })
}

pub fn app(app_state: AppState) -> Router {
    let serve_static = ServeDir::new(&app_state.static_dir);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // UI routes
        .route("/", get(dashboard_handler))
        // HTMX fragment routes
        .route("/fragments/hourly", get(hourly_handler))
        .route("/fragments/daily", get(daily_handler))
        .route("/fragments/forecast", get(forecast_handler))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .nest_service("/static", serve_static)
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
