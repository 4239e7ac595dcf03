use maud::{html, Markup};
use meteo_trends_core::ForecastArtifact;

use crate::{
    db::{DailyTrend, HourlyTrend},
    templates::{
        fragments::{daily_table, forecast_table, hourly_table},
        layouts::{base, PageConfig},
    },
};

/// Dashboard page data, one independently-loaded section per field.
/// A failed section carries the reason so the page can render a notice
/// in its place while the others still show data.
pub struct DashboardData {
    pub hourly: Result<Vec<HourlyTrend>, String>,
    pub daily: Result<Vec<DailyTrend>, String>,
    pub forecast: Result<Option<ForecastArtifact>, String>,
}

/// Dashboard page - hourly means, forecast, and daily means
pub fn dashboard_page(data: &DashboardData) -> Markup {
    let config = PageConfig {
        title: "Meteo Trends - Dashboard",
    };

    base(&config, dashboard_content(data))
}

/// Dashboard content - can be used for full page or HTMX partial
pub fn dashboard_content(data: &DashboardData) -> Markup {
    html! {
        (forecast_table(&data.forecast))

        div class="mt-4" {
            (hourly_table(&data.hourly))
        }

        div class="mt-4" {
            (daily_table(&data.daily))
        }
    }
}
