use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use std::{path::Path, str::FromStr};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
}

/// One row of the hourly mean table
#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct HourlyTrend {
    pub date: String,
    pub hour: i64,
    pub media_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
}

/// One row of the daily mean table
#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct DailyTrend {
    pub date: String,
    pub media_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
}

/// Read-side access to the aggregate tables the pipeline maintains
#[async_trait]
pub trait TrendData: Sync + Send {
    /// Most recent hourly means, newest first
    async fn latest_hourly(&self, limit: i64) -> Result<Vec<HourlyTrend>, Error>;
    /// Daily means over the trailing `days` days, newest first
    async fn daily_trend(&self, days: i64) -> Result<Vec<DailyTrend>, Error>;
}

pub struct TrendAccess {
    pool: SqlitePool,
}

impl TrendAccess {
    /// Open the pipeline's database read-side.
    ///
    /// The file is created when missing so the dashboard can start before
    /// the pipeline ever ran; queries against the absent tables fail and
    /// the UI degrades to a notice instead.
    pub async fn new(db_path: &str) -> Result<Self, Error> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                meteo_trends_core::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))
            .map_err(sqlx::Error::from)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(3)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl TrendData for TrendAccess {
    async fn latest_hourly(&self, limit: i64) -> Result<Vec<HourlyTrend>, Error> {
        let rows = sqlx::query_as::<_, HourlyTrend>(
            r#"SELECT date, hour, media_temp, min_temp, max_temp
               FROM media_horaria
               ORDER BY date DESC, hour DESC
               LIMIT ?1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn daily_trend(&self, days: i64) -> Result<Vec<DailyTrend>, Error> {
        let rows = sqlx::query_as::<_, DailyTrend>(
            r#"SELECT date, media_temp, min_temp, max_temp
               FROM media_diaria
               ORDER BY date DESC
               LIMIT ?1"#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
