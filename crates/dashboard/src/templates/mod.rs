pub mod fragments;
pub mod layouts;
pub mod pages;

pub use fragments::{
    daily_table, daily_table_body, forecast_table, forecast_table_body, hourly_table,
    hourly_table_body,
};
pub use layouts::{base, PageConfig};
pub use pages::{dashboard::DashboardData, dashboard_page};
