//! meteo-trends Core Library
//!
//! Shared utilities for the pipeline and dashboard services:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Forecast artifact hand-off between pipeline and dashboard

pub mod artifact;
mod config;
pub mod fs;

pub use artifact::{
    ArtifactStore, ForecastArtifact, ForecastPoint, Manifest, MANIFEST_FILE_NAME,
};
pub use config::{find_config_file, load_config, ConfigError, ConfigSource};
pub use fs::{create_dir_all, ensure_dir_exists, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "meteo-trends";

/// Default dashboard port
pub const DEFAULT_DASHBOARD_PORT: u16 = 9400;

/// Default collection window in days when no start date is given
pub const DEFAULT_WINDOW_DAYS: i64 = 60;

/// Default forecast horizon in hours
pub const DEFAULT_HORIZON_HOURS: usize = 48;
