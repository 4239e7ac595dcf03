use std::sync::Arc;

use axum::{extract::State, response::Html};
use log::warn;
use meteo_trends_core::ForecastArtifact;

use crate::{
    db::{DailyTrend, HourlyTrend},
    templates::{dashboard_page, pages::dashboard::DashboardData},
    AppState,
};

/// Hours of hourly means shown on the dashboard
pub(crate) const HOURLY_LIMIT: i64 = 48;

/// Days of daily means shown on the dashboard
pub(crate) const DAILY_LIMIT: i64 = 30;

/// Handler for the dashboard page (GET /)
pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let data = build_dashboard_data(&state).await;
    Html(dashboard_page(&data).into_string())
}

async fn build_dashboard_data(state: &Arc<AppState>) -> DashboardData {
    DashboardData {
        hourly: load_hourly(state).await,
        daily: load_daily(state).await,
        forecast: load_forecast(state),
    }
}

pub(crate) async fn load_hourly(state: &Arc<AppState>) -> Result<Vec<HourlyTrend>, String> {
    state.trends.latest_hourly(HOURLY_LIMIT).await.map_err(|e| {
        warn!("hourly aggregates unavailable: {}", e);
        e.to_string()
    })
}

pub(crate) async fn load_daily(state: &Arc<AppState>) -> Result<Vec<DailyTrend>, String> {
    state.trends.daily_trend(DAILY_LIMIT).await.map_err(|e| {
        warn!("daily aggregates unavailable: {}", e);
        e.to_string()
    })
}

pub(crate) fn load_forecast(state: &Arc<AppState>) -> Result<Option<ForecastArtifact>, String> {
    state.artifacts.load_current().map_err(|e| {
        warn!("forecast artifact unavailable: {}", e);
        e.to_string()
    })
}
