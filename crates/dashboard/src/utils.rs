use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use meteo_trends_core::{find_config_file, load_config, ConfigSource, DEFAULT_DASHBOARD_PORT};
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "meteo-trends dashboard - temperature trends and forecast viewer"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $METEO_DASHBOARD_CONFIG, ./dashboard.toml,
    /// $XDG_CONFIG_HOME/meteo-trends/dashboard.toml, /etc/meteo-trends/dashboard.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "METEO_DASHBOARD_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, env = "METEO_DASHBOARD_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "METEO_DASHBOARD_PORT")]
    pub port: Option<String>,

    /// Path to the SQLite database the pipeline writes
    #[arg(short, long, env = "METEO_DASHBOARD_DATABASE")]
    pub database: Option<String>,

    /// Directory holding forecast artifacts and their manifest
    #[arg(short, long, env = "METEO_DASHBOARD_MODELS_DIR")]
    pub models_dir: Option<String>,

    /// Directory containing UI static files
    #[arg(short, long, env = "METEO_DASHBOARD_UI_DIR")]
    pub ui_dir: Option<String>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_DASHBOARD_PORT.to_string())
    }

    pub fn database(&self) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| "./data/clima.sqlite".to_string())
    }

    pub fn models_dir(&self) -> String {
        self.models_dir
            .clone()
            .unwrap_or_else(|| "./models".to_string())
    }

    pub fn static_dir(&self) -> String {
        self.ui_dir.clone().unwrap_or_else(|| "./static".to_string())
    }
}

/// Load configuration from CLI args, config file, and environment.
/// The resolved source is returned so the caller can log it once the
/// logger exists; nothing emitted here would be seen.
pub fn get_config_info() -> (Cli, ConfigSource) {
    let cli_args = Cli::parse();
    let source = resolve_config_source(cli_args.config.as_deref());
    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    let cli = Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        host: cli_args.host.or(file_config.host),
        port: cli_args.port.or(file_config.port),
        database: cli_args.database.or(file_config.database),
        models_dir: cli_args.models_dir.or(file_config.models_dir),
        ui_dir: cli_args.ui_dir.or(file_config.ui_dir),
    };
    (cli, source)
}

fn resolve_config_source(explicit: Option<&str>) -> ConfigSource {
    match explicit {
        Some(path) => ConfigSource::Explicit(path.into()),
        None => find_config_file("METEO_DASHBOARD_CONFIG", "dashboard.toml"),
    }
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc().format(&Iso8601::DEFAULT).unwrap(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_flag_wins_over_discovery() {
        let source = resolve_config_source(Some("/tmp/dashboard.toml"));
        assert_eq!(source, ConfigSource::Explicit("/tmp/dashboard.toml".into()));
    }

    #[test]
    fn log_level_defaults_to_info_on_unknown_value() {
        let cli = Cli {
            level: Some("verbose".to_string()),
            ..Cli::default()
        };
        assert_eq!(get_log_level(&cli), LevelFilter::Info);
    }
}
