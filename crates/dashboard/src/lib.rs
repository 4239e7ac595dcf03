pub mod db;
pub mod routes;
pub mod startup;
pub mod templates;
pub mod utils;

pub use db::{DailyTrend, HourlyTrend, TrendAccess, TrendData};
pub use routes::{daily_handler, dashboard_handler, forecast_handler, hourly_handler};
pub use startup::{app, build_app_state, AppState};
pub use utils::{get_config_info, get_log_level, setup_logger, Cli};
