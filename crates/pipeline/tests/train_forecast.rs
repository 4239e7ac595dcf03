use meteo_trends_core::ArtifactStore;
use pipeline::{aggregate, forecast, Observation, Store};
use slog::{o, Discard, Logger};
use time::{macros::datetime, Duration, OffsetDateTime};

fn test_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Three days of hourly observations with a clean daily temperature cycle
async fn seeded_store(days: i64) -> Store {
    let store = Store::open_in_memory().await.unwrap();
    let start = datetime!(2025-09-01 00:00);

    let batch: Vec<Observation> = (0..days * 24)
        .map(|h| {
            let phase = (h % 24) as f64 / 24.0 * std::f64::consts::TAU;
            Observation {
                time: start + Duration::hours(h),
                temperature_2m: Some(20.0 + 5.0 * phase.sin()),
                relativehumidity_2m: Some(75.0),
                precipitation: Some(0.0),
                windspeed_10m: Some(8.0),
                collected_at: OffsetDateTime::UNIX_EPOCH,
            }
        })
        .collect();
    store.merge_observations(&batch).await.unwrap();
    store
}

#[tokio::test]
async fn trains_and_writes_current_artifact() {
    let store = seeded_store(3).await;
    let processed = tempfile::tempdir().unwrap();
    let models = tempfile::tempdir().unwrap();

    aggregate::run(&store, processed.path().to_str().unwrap(), &test_logger())
        .await
        .unwrap();

    let artifacts = ArtifactStore::new(models.path());
    let artifact = forecast::run(&store, &artifacts, 48, &test_logger())
        .await
        .unwrap();

    assert_eq!(artifact.horizon, 48);
    assert_eq!(artifact.points.len(), 48);
    assert_eq!(artifact.cutoff, "2025-09-03 23:00:00");
    assert_eq!(artifact.points[0].ds, "2025-09-04 00:00:00");

    for point in &artifact.points {
        assert!(point.yhat_lower <= point.yhat, "lower bound above point");
        assert!(point.yhat <= point.yhat_upper, "upper bound below point");
        assert!(point.yhat.is_finite());
    }

    // The manifest resolves to what was just trained
    let current = artifacts.load_current().unwrap().unwrap();
    assert_eq!(current.id, artifact.id);
}

#[tokio::test]
async fn refuses_to_train_on_a_short_series() {
    let store = seeded_store(3).await;
    let processed = tempfile::tempdir().unwrap();
    let models = tempfile::tempdir().unwrap();

    // Keep only 6 hours of observations before aggregating
    sqlx::query("DELETE FROM clima_horario WHERE time >= '2025-09-01 06:00:00'")
        .execute(store.pool())
        .await
        .unwrap();
    aggregate::run(&store, processed.path().to_str().unwrap(), &test_logger())
        .await
        .unwrap();

    let artifacts = ArtifactStore::new(models.path());
    let result = forecast::run(&store, &artifacts, 48, &test_logger()).await;
    assert!(matches!(result, Err(forecast::Error::InsufficientData(6))));
    assert!(artifacts.load_current().unwrap().is_none());
}
