use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::{
    routes::dashboard::{load_daily, load_forecast, load_hourly},
    templates::{daily_table_body, forecast_table_body, hourly_table_body},
    AppState,
};

/// Handler for the hourly means fragment (GET /fragments/hourly)
pub async fn hourly_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let hourly = load_hourly(&state).await;
    Html(hourly_table_body(&hourly).into_string())
}

/// Handler for the daily means fragment (GET /fragments/daily)
pub async fn daily_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let daily = load_daily(&state).await;
    Html(daily_table_body(&daily).into_string())
}

/// Handler for the forecast fragment (GET /fragments/forecast)
pub async fn forecast_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let forecast = load_forecast(&state);
    Html(forecast_table_body(&forecast).into_string())
}
