use slog::{info, Logger};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::{path::Path, str::FromStr, time::Duration};
use time::{
    format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

/// Timestamp layout used for the `time` primary key. Kept lexicographically
/// sortable so SQLite's date functions and ORDER BY work on the raw text.
pub const STORE_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to format time string: {0}")]
    TimeFormat(#[from] time::error::Format),
    #[error("failed to parse time string: {0}")]
    TimeParse(#[from] time::error::Parse),
    #[error("failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
}

/// One hourly weather observation, keyed by its naive local timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub time: PrimitiveDateTime,
    pub temperature_2m: Option<f64>,
    pub relativehumidity_2m: Option<f64>,
    pub precipitation: Option<f64>,
    pub windspeed_10m: Option<f64>,
    pub collected_at: OffsetDateTime,
}

/// Time-series store with an explicit lifecycle: opened at stage start,
/// passed by reference, closed at stage end.
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open(path: &str, logger: &Logger) -> Result<Self, Error> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                meteo_trends_core::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!(logger, "sqlite store opened"; "path" => path);

        Ok(store)
    }

    /// In-memory store for tests
    pub async fn open_in_memory() -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Reconcile a batch of observations into `clima_horario`.
    ///
    /// The batch is bulk-loaded into a staging table, then folded into the
    /// primary table with a single conflict-aware insert keyed by `time`:
    /// existing rows are overwritten column by column (last write wins),
    /// rows absent from the batch are untouched. Everything, staging table
    /// included, lives inside one transaction, so a failure at any point
    /// rolls the store back to its pre-merge state and leaves no staging
    /// residue behind.
    ///
    /// Returns the number of rows inserted or overwritten.
    pub async fn merge_observations(&self, batch: &[Observation]) -> Result<u64, Error> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS clima_staging")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "CREATE TABLE clima_staging (
                time TEXT NOT NULL,
                temperature_2m REAL,
                relativehumidity_2m REAL,
                precipitation REAL,
                windspeed_10m REAL,
                collected_at TEXT NOT NULL
            )",
        )
        .execute(&mut *tx)
        .await?;

        for obs in batch {
            sqlx::query(
                "INSERT INTO clima_staging (
                    time, temperature_2m, relativehumidity_2m,
                    precipitation, windspeed_10m, collected_at
                ) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(obs.time.format(&STORE_TIME_FORMAT)?)
            .bind(obs.temperature_2m)
            .bind(obs.relativehumidity_2m)
            .bind(obs.precipitation)
            .bind(obs.windspeed_10m)
            .bind(
                obs.collected_at
                    .format(&time::format_description::well_known::Rfc3339)?,
            )
            .execute(&mut *tx)
            .await?;
        }

        // The WHERE TRUE disambiguates the upsert clause from a join for
        // SQLite's parser.
        let merged = sqlx::query(
            "INSERT INTO clima_horario (
                time, temperature_2m, relativehumidity_2m,
                precipitation, windspeed_10m, collected_at
            )
            SELECT time, temperature_2m, relativehumidity_2m,
                   precipitation, windspeed_10m, collected_at
            FROM clima_staging
            WHERE TRUE
            ON CONFLICT(time) DO UPDATE SET
                temperature_2m = excluded.temperature_2m,
                relativehumidity_2m = excluded.relativehumidity_2m,
                precipitation = excluded.precipitation,
                windspeed_10m = excluded.windspeed_10m,
                collected_at = excluded.collected_at",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("DROP TABLE clima_staging")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(merged.rows_affected())
    }

    pub async fn observation_count(&self) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clima_horario")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Most recent observation timestamp, if any rows exist
    pub async fn latest_observation_time(&self) -> Result<Option<PrimitiveDateTime>, Error> {
        let max: Option<String> = sqlx::query_scalar("SELECT MAX(time) FROM clima_horario")
            .fetch_one(&self.pool)
            .await?;

        match max {
            Some(text) => Ok(Some(PrimitiveDateTime::parse(&text, &STORE_TIME_FORMAT)?)),
            None => Ok(None),
        }
    }

    /// Observations in the closed range `[start, end]`, ordered by time.
    /// Used by tests and ad-hoc inspection; stages read through SQL directly.
    pub async fn observations_between(
        &self,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> Result<Vec<Observation>, Error> {
        let rows = sqlx::query(
            "SELECT time, temperature_2m, relativehumidity_2m,
                    precipitation, windspeed_10m, collected_at
             FROM clima_horario
             WHERE time >= ? AND time <= ?
             ORDER BY time",
        )
        .bind(start.format(&STORE_TIME_FORMAT)?)
        .bind(end.format(&STORE_TIME_FORMAT)?)
        .fetch_all(&self.pool)
        .await?;

        let mut observations = Vec::with_capacity(rows.len());
        for row in rows {
            let time_text: String = row.get("time");
            let collected_text: String = row.get("collected_at");
            observations.push(Observation {
                time: PrimitiveDateTime::parse(&time_text, &STORE_TIME_FORMAT)?,
                temperature_2m: row.get("temperature_2m"),
                relativehumidity_2m: row.get("relativehumidity_2m"),
                precipitation: row.get("precipitation"),
                windspeed_10m: row.get("windspeed_10m"),
                collected_at: OffsetDateTime::parse(
                    &collected_text,
                    &time::format_description::well_known::Rfc3339,
                )?,
            });
        }

        Ok(observations)
    }
}
