use axum::Router;
use dashboard::{app, db, AppState, DailyTrend, HourlyTrend, TrendData};
use meteo_trends_core::{ArtifactStore, ForecastArtifact, ForecastPoint};
use std::sync::Arc;
use tempfile::TempDir;

mockall::mock! {
    pub TrendAccess {}

    #[async_trait::async_trait]
    impl TrendData for TrendAccess {
        async fn latest_hourly(&self, limit: i64) -> Result<Vec<HourlyTrend>, db::Error>;
        async fn daily_trend(&self, days: i64) -> Result<Vec<DailyTrend>, db::Error>;
    }
}

pub struct TestApp {
    pub app: Router,
    pub artifacts: Arc<ArtifactStore>,
    // Dropped with the test, taking the artifact directory with it
    _models_dir: TempDir,
}

pub async fn spawn_app(trends: Arc<dyn TrendData>) -> TestApp {
    let models_dir = tempfile::tempdir().expect("failed to create models dir");
    let artifacts = Arc::new(ArtifactStore::new(models_dir.path()));

    let state = AppState {
        static_dir: "./static".to_string(),
        trends,
        artifacts: artifacts.clone(),
    };

    TestApp {
        app: app(state),
        artifacts,
        _models_dir: models_dir,
    }
}

pub fn mock_hourly_rows() -> Vec<HourlyTrend> {
    vec![
        HourlyTrend {
            date: "2025-09-01".to_string(),
            hour: 11,
            media_temp: 22.5,
            min_temp: 21.0,
            max_temp: 24.0,
        },
        HourlyTrend {
            date: "2025-09-01".to_string(),
            hour: 10,
            media_temp: 20.0,
            min_temp: 18.0,
            max_temp: 22.0,
        },
    ]
}

pub fn mock_daily_rows() -> Vec<DailyTrend> {
    vec![
        DailyTrend {
            date: "2025-09-01".to_string(),
            media_temp: 21.3,
            min_temp: 18.0,
            max_temp: 24.0,
        },
        DailyTrend {
            date: "2025-08-31".to_string(),
            media_temp: 20.1,
            min_temp: 16.5,
            max_temp: 23.2,
        },
    ]
}

pub fn mock_artifact() -> ForecastArtifact {
    ForecastArtifact::new(
        "2025-09-01 23:00:00".to_string(),
        2,
        0.95,
        vec![
            ForecastPoint {
                ds: "2025-09-02 00:00:00".to_string(),
                yhat: 19.7,
                yhat_lower: 18.2,
                yhat_upper: 21.2,
            },
            ForecastPoint {
                ds: "2025-09-02 01:00:00".to_string(),
                yhat: 19.1,
                yhat_lower: 17.6,
                yhat_upper: 20.6,
            },
        ],
    )
}
