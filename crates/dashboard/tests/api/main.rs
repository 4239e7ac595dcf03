mod dashboard_ui;
mod helpers;
mod trend_access;
