use anyhow::{anyhow, Context};
use meteo_trends_core::ArtifactStore;
use pipeline::{
    aggregate, forecast, get_config_info, setup_logger, ArchiveClient, ArchiveQuery, Cli, Stage,
    Store,
};
use slog::{info, Logger};
use time::{macros::format_description, Date, Duration, OffsetDateTime};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info();
    let logger = setup_logger(&cli);

    let stage = cli.stage.unwrap_or_default();
    info!(logger, "meteo-trends pipeline starting";
        "stage" => format!("{:?}", stage), "database" => cli.database());

    match stage {
        Stage::Collect => collect(&cli, &logger).await,
        Stage::Aggregate => aggregate_stage(&cli, &logger).await,
        Stage::Train => train(&cli, &logger).await,
    }
}

async fn collect(cli: &Cli, logger: &Logger) -> Result<(), anyhow::Error> {
    let (start_date, end_date) = collection_window(cli)?;

    let client = ArchiveClient::new(logger.clone(), cli.archive_url())?;
    let batch = client
        .fetch_hourly(&ArchiveQuery {
            latitude: cli.latitude(),
            longitude: cli.longitude(),
            start_date,
            end_date,
            timezone: cli.timezone(),
        })
        .await?;

    // The store is only touched once the whole batch is in hand, so a
    // source failure can never leave a partial ingestion behind.
    let store = Store::open(&cli.database(), logger).await?;
    let merged = store.merge_observations(&batch).await?;
    let total = store.observation_count().await?;
    info!(logger, "collection finished";
        "fetched" => batch.len(), "merged" => merged, "stored_total" => total);

    store.close().await;
    Ok(())
}

async fn aggregate_stage(cli: &Cli, logger: &Logger) -> Result<(), anyhow::Error> {
    let store = Store::open(&cli.database(), logger).await?;
    let summary = aggregate::run(&store, &cli.processed_dir(), logger).await?;
    info!(logger, "aggregation finished";
        "hourly_rows" => summary.hourly_rows, "daily_rows" => summary.daily_rows);

    store.close().await;
    Ok(())
}

async fn train(cli: &Cli, logger: &Logger) -> Result<(), anyhow::Error> {
    let store = Store::open(&cli.database(), logger).await?;
    let artifacts = ArtifactStore::new(cli.models_dir());
    let artifact = forecast::run(&store, &artifacts, cli.horizon_hours(), logger).await?;
    info!(logger, "training finished";
        "artifact" => artifact.file_name(), "points" => artifact.points.len());

    store.close().await;
    Ok(())
}

/// Closed collection date range: explicit overrides, or a trailing window
/// of `window_days` ending today (UTC)
fn collection_window(cli: &Cli) -> Result<(Date, Date), anyhow::Error> {
    let date_format = format_description!("[year]-[month]-[day]");
    let today = OffsetDateTime::now_utc().date();

    let end_date = match &cli.end_date {
        Some(raw) => Date::parse(raw, &date_format)
            .with_context(|| format!("invalid end date: {}", raw))?,
        None => today,
    };
    let start_date = match &cli.start_date {
        Some(raw) => Date::parse(raw, &date_format)
            .with_context(|| format!("invalid start date: {}", raw))?,
        None => end_date - Duration::days(cli.window_days()),
    };

    if start_date > end_date {
        return Err(anyhow!(
            "start date {} is after end date {}",
            start_date,
            end_date
        ));
    }

    Ok((start_date, end_date))
}
