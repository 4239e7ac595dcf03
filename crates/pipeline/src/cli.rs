use clap::{Parser, Subcommand};
use meteo_trends_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_HORIZON_HOURS, DEFAULT_WINDOW_DAYS,
};
use slog::{o, Drain, Level, Logger};
use std::env;

use crate::source::DEFAULT_ARCHIVE_URL;

#[derive(Subcommand, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    /// Fetch the archive window and merge it into the store
    #[default]
    Collect,
    /// Recompute the hourly/daily summary tables and CSV mirrors
    Aggregate,
    /// Train the forecast model and write the artifact
    Train,
}

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "meteo-trends pipeline - collects, aggregates and forecasts hourly weather"
)]
pub struct Cli {
    /// Stage to run
    #[command(subcommand)]
    #[serde(skip)]
    pub stage: Option<Stage>,

    /// Path to config file (TOML format)
    /// Searched in order: this flag, $METEO_PIPELINE_CONFIG, ./pipeline.toml,
    /// $XDG_CONFIG_HOME/meteo-trends/pipeline.toml, /etc/meteo-trends/pipeline.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "METEO_PIPELINE_LEVEL")]
    pub level: Option<String>,

    /// Path to the SQLite observation store
    #[arg(short, long, env = "METEO_PIPELINE_DATABASE")]
    pub database: Option<String>,

    /// Directory for CSV mirrors of the aggregate tables
    #[arg(long, env = "METEO_PIPELINE_PROCESSED_DIR")]
    pub processed_dir: Option<String>,

    /// Directory for forecast artifacts and their manifest
    #[arg(long, env = "METEO_PIPELINE_MODELS_DIR")]
    pub models_dir: Option<String>,

    /// Base URL of the weather archive API
    #[arg(long, env = "METEO_PIPELINE_ARCHIVE_URL")]
    pub archive_url: Option<String>,

    /// Latitude of the observed location
    #[arg(long, env = "METEO_PIPELINE_LATITUDE")]
    pub latitude: Option<f64>,

    /// Longitude of the observed location
    #[arg(long, env = "METEO_PIPELINE_LONGITUDE")]
    pub longitude: Option<f64>,

    /// Timezone the archive reports naive timestamps in
    #[arg(long, env = "METEO_PIPELINE_TIMEZONE")]
    pub timezone: Option<String>,

    /// Collection window length in days, ending today, when no explicit
    /// start date is given
    #[arg(long, env = "METEO_PIPELINE_WINDOW_DAYS")]
    pub window_days: Option<i64>,

    /// Explicit collection start date (YYYY-MM-DD)
    #[arg(long, env = "METEO_PIPELINE_START_DATE")]
    pub start_date: Option<String>,

    /// Explicit collection end date (YYYY-MM-DD)
    #[arg(long, env = "METEO_PIPELINE_END_DATE")]
    pub end_date: Option<String>,

    /// Forecast horizon in hours
    #[arg(long, env = "METEO_PIPELINE_HORIZON_HOURS")]
    pub horizon_hours: Option<usize>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn database(&self) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| "./data/clima.sqlite".to_string())
    }

    pub fn processed_dir(&self) -> String {
        self.processed_dir
            .clone()
            .unwrap_or_else(|| "./data/processed".to_string())
    }

    pub fn models_dir(&self) -> String {
        self.models_dir
            .clone()
            .unwrap_or_else(|| "./models".to_string())
    }

    pub fn archive_url(&self) -> String {
        self.archive_url
            .clone()
            .unwrap_or_else(|| DEFAULT_ARCHIVE_URL.to_string())
    }

    pub fn latitude(&self) -> f64 {
        self.latitude.unwrap_or(-23.55)
    }

    pub fn longitude(&self) -> f64 {
        self.longitude.unwrap_or(-46.63)
    }

    pub fn timezone(&self) -> String {
        self.timezone
            .clone()
            .unwrap_or_else(|| "America/Sao_Paulo".to_string())
    }

    pub fn window_days(&self) -> i64 {
        self.window_days.unwrap_or(DEFAULT_WINDOW_DAYS)
    }

    pub fn horizon_hours(&self) -> usize {
        self.horizon_hours.unwrap_or(DEFAULT_HORIZON_HOURS)
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    // Determine config file path
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("METEO_PIPELINE_CONFIG", "pipeline.toml")
    };

    // Load from config file
    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    Cli {
        stage: cli_args.stage,
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        database: cli_args.database.or(file_config.database),
        processed_dir: cli_args.processed_dir.or(file_config.processed_dir),
        models_dir: cli_args.models_dir.or(file_config.models_dir),
        archive_url: cli_args.archive_url.or(file_config.archive_url),
        latitude: cli_args.latitude.or(file_config.latitude),
        longitude: cli_args.longitude.or(file_config.longitude),
        timezone: cli_args.timezone.or(file_config.timezone),
        window_days: cli_args.window_days.or(file_config.window_days),
        start_date: cli_args.start_date.or(file_config.start_date),
        end_date: cli_args.end_date.or(file_config.end_date),
        horizon_hours: cli_args.horizon_hours.or(file_config.horizon_hours),
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = if let Some(level) = cli.level.as_ref() {
        parse_level(level)
    } else {
        let rust_log = env::var("RUST_LOG").unwrap_or_default();
        parse_level(&rust_log)
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}
