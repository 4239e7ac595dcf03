use dashboard::{TrendAccess, TrendData};
use sqlx::sqlite::SqlitePoolOptions;

async fn seeded_db(dir: &tempfile::TempDir) -> String {
    let path = dir
        .path()
        .join("clima.sqlite")
        .to_str()
        .expect("utf8 path")
        .to_string();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite://{}?mode=rwc", path))
        .await
        .expect("failed to create test database");

    sqlx::query(
        r#"CREATE TABLE media_horaria (
               date TEXT NOT NULL,
               hour INTEGER NOT NULL,
               media_temp REAL NOT NULL,
               min_temp REAL NOT NULL,
               max_temp REAL NOT NULL,
               PRIMARY KEY (date, hour)
           )"#,
    )
    .execute(&pool)
    .await
    .expect("failed to create media_horaria");

    sqlx::query(
        r#"CREATE TABLE media_diaria (
               date TEXT NOT NULL PRIMARY KEY,
               media_temp REAL NOT NULL,
               min_temp REAL NOT NULL,
               max_temp REAL NOT NULL
           )"#,
    )
    .execute(&pool)
    .await
    .expect("failed to create media_diaria");

    for (date, hour, temp) in [
        ("2025-09-01", 23, 18.0),
        ("2025-09-02", 0, 17.5),
        ("2025-09-02", 1, 17.0),
    ] {
        sqlx::query("INSERT INTO media_horaria VALUES (?1, ?2, ?3, ?3, ?3)")
            .bind(date)
            .bind(hour)
            .bind(temp)
            .execute(&pool)
            .await
            .unwrap();
    }
    for (date, temp) in [("2025-09-01", 18.0), ("2025-09-02", 17.25)] {
        sqlx::query("INSERT INTO media_diaria VALUES (?1, ?2, ?2, ?2)")
            .bind(date)
            .bind(temp)
            .execute(&pool)
            .await
            .unwrap();
    }
    pool.close().await;

    path
}

#[tokio::test]
async fn reads_aggregates_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = seeded_db(&dir).await;

    let access = TrendAccess::new(&path).await.unwrap();

    let hourly = access.latest_hourly(2).await.unwrap();
    assert_eq!(hourly.len(), 2);
    assert_eq!((hourly[0].date.as_str(), hourly[0].hour), ("2025-09-02", 1));
    assert_eq!((hourly[1].date.as_str(), hourly[1].hour), ("2025-09-02", 0));

    let daily = access.daily_trend(14).await.unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].date, "2025-09-02");
    assert_eq!(daily[0].media_temp, 17.25);
}

#[tokio::test]
async fn opens_before_the_pipeline_ever_ran() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir
        .path()
        .join("missing.sqlite")
        .to_str()
        .unwrap()
        .to_string();

    // The file is created empty, so open succeeds and queries fail instead
    let access = TrendAccess::new(&path).await.unwrap();
    assert!(access.latest_hourly(48).await.is_err());
    assert!(access.daily_trend(14).await.is_err());
}
