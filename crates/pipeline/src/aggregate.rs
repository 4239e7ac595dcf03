use slog::{info, Logger};
use sqlx::Row;
use std::fs;
use std::path::Path;

use crate::store::Store;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("failed to write csv output: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to prepare output directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HourlyAggregate {
    pub date: String,
    pub hour: i64,
    pub media_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DailyAggregate {
    pub date: String,
    pub media_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
}

pub struct AggregateSummary {
    pub hourly_rows: usize,
    pub daily_rows: usize,
}

/// Recompute both summary tables from scratch and mirror them as CSV.
///
/// Rows with null temperature are dropped before grouping. The tables and
/// the CSV directories are rewritten wholesale on every run; they are
/// disposable caches of the observation table, never merged incrementally.
pub async fn run(
    store: &Store,
    processed_dir: &str,
    logger: &Logger,
) -> Result<AggregateSummary, Error> {
    let hourly = hourly_aggregates(store).await?;
    let daily = daily_aggregates(store).await?;

    overwrite_tables(store, &hourly, &daily).await?;
    info!(logger, "aggregate tables rewritten";
        "hourly_rows" => hourly.len(), "daily_rows" => daily.len());

    export_csv(processed_dir, "media_horaria", &hourly)?;
    export_csv(processed_dir, "media_diaria", &daily)?;
    info!(logger, "csv mirrors written"; "dir" => processed_dir);

    Ok(AggregateSummary {
        hourly_rows: hourly.len(),
        daily_rows: daily.len(),
    })
}

pub async fn hourly_aggregates(store: &Store) -> Result<Vec<HourlyAggregate>, Error> {
    let rows = sqlx::query(
        "SELECT date(time) AS date,
                CAST(strftime('%H', time) AS INTEGER) AS hour,
                AVG(temperature_2m) AS media_temp,
                MIN(temperature_2m) AS min_temp,
                MAX(temperature_2m) AS max_temp
         FROM clima_horario
         WHERE temperature_2m IS NOT NULL
         GROUP BY date(time), hour
         ORDER BY date, hour",
    )
    .fetch_all(store.pool())
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| HourlyAggregate {
            date: row.get("date"),
            hour: row.get("hour"),
            media_temp: row.get("media_temp"),
            min_temp: row.get("min_temp"),
            max_temp: row.get("max_temp"),
        })
        .collect())
}

pub async fn daily_aggregates(store: &Store) -> Result<Vec<DailyAggregate>, Error> {
    let rows = sqlx::query(
        "SELECT date(time) AS date,
                AVG(temperature_2m) AS media_temp,
                MIN(temperature_2m) AS min_temp,
                MAX(temperature_2m) AS max_temp
         FROM clima_horario
         WHERE temperature_2m IS NOT NULL
         GROUP BY date(time)
         ORDER BY date",
    )
    .fetch_all(store.pool())
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| DailyAggregate {
            date: row.get("date"),
            media_temp: row.get("media_temp"),
            min_temp: row.get("min_temp"),
            max_temp: row.get("max_temp"),
        })
        .collect())
}

async fn overwrite_tables(
    store: &Store,
    hourly: &[HourlyAggregate],
    daily: &[DailyAggregate],
) -> Result<(), Error> {
    let mut tx = store.pool().begin().await?;

    sqlx::query("DELETE FROM media_horaria")
        .execute(&mut *tx)
        .await?;
    for row in hourly {
        sqlx::query(
            "INSERT INTO media_horaria (date, hour, media_temp, min_temp, max_temp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&row.date)
        .bind(row.hour)
        .bind(row.media_temp)
        .bind(row.min_temp)
        .bind(row.max_temp)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM media_diaria")
        .execute(&mut *tx)
        .await?;
    for row in daily {
        sqlx::query(
            "INSERT INTO media_diaria (date, media_temp, min_temp, max_temp)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&row.date)
        .bind(row.media_temp)
        .bind(row.min_temp)
        .bind(row.max_temp)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Write one table as a headered CSV part file under its own directory.
/// Consumers must tolerate any partitioning; today there is a single part.
fn export_csv<T: serde::Serialize>(processed_dir: &str, table: &str, rows: &[T]) -> Result<(), Error> {
    let dir = Path::new(processed_dir).join(table);
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;

    let mut writer = csv::Writer::from_path(dir.join("part-00000.csv"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
