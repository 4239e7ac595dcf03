use crate::helpers::{
    mock_artifact, mock_daily_rows, mock_hourly_rows, spawn_app, MockTrendAccess,
};
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use dashboard::db;
use hyper::{header, Method};
use std::sync::Arc;
use tower::ServiceExt;

async fn get_html(app: &axum::Router, uri: &str) -> (hyper::StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Test that the dashboard renders aggregate data from the trend store
#[tokio::test]
async fn dashboard_renders_hourly_and_daily_means() {
    let mut trends = MockTrendAccess::new();

    trends
        .expect_latest_hourly()
        .times(1)
        .returning(|_| Ok(mock_hourly_rows()));
    trends
        .expect_daily_trend()
        .times(1)
        .returning(|_| Ok(mock_daily_rows()));

    let test_app = spawn_app(Arc::new(trends)).await;
    let (status, html) = get_html(&test_app.app, "/").await;

    assert!(status.is_success());
    assert!(html.contains("Hourly Means"));
    assert!(html.contains("Daily Means"));
    assert!(html.contains("2025-09-01"));
    assert!(html.contains("22.5°C"));
    assert!(html.contains("21.3°C"));
    // Nothing trained yet, so the forecast section is a notice
    assert!(html.contains("No forecast has been trained yet."));
}

/// Test that a missing database degrades to notices instead of failing the page
#[tokio::test]
async fn dashboard_renders_notices_when_aggregates_are_missing() {
    let mut trends = MockTrendAccess::new();

    trends
        .expect_latest_hourly()
        .times(1)
        .returning(|_| Err(db::Error::Query(sqlx::Error::RowNotFound)));
    trends
        .expect_daily_trend()
        .times(1)
        .returning(|_| Err(db::Error::Query(sqlx::Error::RowNotFound)));

    let test_app = spawn_app(Arc::new(trends)).await;
    let (status, html) = get_html(&test_app.app, "/").await;

    assert!(status.is_success());
    assert!(html.contains("Hourly aggregates are not available yet."));
    assert!(html.contains("Daily aggregates are not available yet."));
}

/// Test that a trained artifact shows up with its horizon and bounds
#[tokio::test]
async fn dashboard_renders_current_forecast() {
    let mut trends = MockTrendAccess::new();

    trends
        .expect_latest_hourly()
        .times(1)
        .returning(|_| Ok(Vec::new()));
    trends
        .expect_daily_trend()
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let test_app = spawn_app(Arc::new(trends)).await;
    test_app
        .artifacts
        .save(&mock_artifact())
        .expect("failed to save artifact");

    let (status, html) = get_html(&test_app.app, "/").await;

    assert!(status.is_success());
    assert!(html.contains("2 hours ahead of 2025-09-01 23:00:00"));
    assert!(html.contains("19.7°C"));
    assert!(html.contains("18.2°C"));
}

/// Test that the hourly fragment asks for a 48-hour window and returns a partial
#[tokio::test]
async fn hourly_fragment_returns_partial_with_48_hour_limit() {
    let mut trends = MockTrendAccess::new();

    trends
        .expect_latest_hourly()
        .withf(|limit| *limit == 48)
        .times(1)
        .returning(|_| Ok(mock_hourly_rows()));

    let test_app = spawn_app(Arc::new(trends)).await;
    let (status, html) = get_html(&test_app.app, "/fragments/hourly").await;

    assert!(status.is_success());
    assert!(html.contains("22.5°C"));
    // A fragment, not a full document
    assert!(!html.contains("<html"));
}

/// Test that the forecast fragment renders the empty-state notice on its own
#[tokio::test]
async fn forecast_fragment_without_artifact_renders_notice() {
    let trends = MockTrendAccess::new();
    let test_app = spawn_app(Arc::new(trends)).await;

    let (status, html) = get_html(&test_app.app, "/fragments/forecast").await;

    assert!(status.is_success());
    assert!(html.contains("No forecast has been trained yet."));
    assert!(!html.contains("<html"));
}

/// Test that the daily fragment draws the mean line and min/max envelope
/// alongside the table
#[tokio::test]
async fn daily_fragment_renders_chart_with_envelope() {
    let mut trends = MockTrendAccess::new();

    trends
        .expect_daily_trend()
        .times(1)
        .returning(|_| Ok(mock_daily_rows()));

    let test_app = spawn_app(Arc::new(trends)).await;
    let (status, html) = get_html(&test_app.app, "/fragments/daily").await;

    assert!(status.is_success());
    assert!(html.contains("svg class=\"trend-chart\""));
    assert!(html.contains("polygon class=\"chart-band\""));
    assert!(html.contains("polyline class=\"chart-line\""));
    // The chart spans the window, oldest day on the left
    assert!(html.contains(">2025-08-31<"));
    // The table is still there next to the chart
    assert!(html.contains("<table"));
}

/// Test that a trained artifact renders its uncertainty band as a chart
#[tokio::test]
async fn forecast_fragment_renders_chart_with_uncertainty_band() {
    let trends = MockTrendAccess::new();
    let test_app = spawn_app(Arc::new(trends)).await;
    test_app
        .artifacts
        .save(&mock_artifact())
        .expect("failed to save artifact");

    let (status, html) = get_html(&test_app.app, "/fragments/forecast").await;

    assert!(status.is_success());
    assert!(html.contains("svg class=\"trend-chart\""));
    assert!(html.contains("polygon class=\"chart-band\""));
    assert!(html.contains("polyline class=\"chart-line\""));
}

/// Test that the stylesheet the layout links is actually shipped and served
#[tokio::test]
async fn static_stylesheet_is_served() {
    let trends = MockTrendAccess::new();
    let test_app = spawn_app(Arc::new(trends)).await;

    let (status, css) = get_html(&test_app.app, "/static/styles.css").await;

    assert!(status.is_success());
    assert!(css.contains(".weather-value"));
    assert!(css.contains(".trend-chart"));
}

/// Test that the daily fragment surfaces the failure reason as a notice
#[tokio::test]
async fn daily_fragment_renders_notice_on_query_error() {
    let mut trends = MockTrendAccess::new();

    trends
        .expect_daily_trend()
        .times(1)
        .returning(|_| Err(db::Error::Query(sqlx::Error::RowNotFound)));

    let test_app = spawn_app(Arc::new(trends)).await;
    let (status, html) = get_html(&test_app.app, "/fragments/daily").await;

    assert!(status.is_success());
    assert!(html.contains("Daily aggregates are not available yet."));
}
