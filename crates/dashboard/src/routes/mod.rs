mod dashboard;
mod fragments;

pub use dashboard::dashboard_handler;
pub use fragments::{daily_handler, forecast_handler, hourly_handler};
