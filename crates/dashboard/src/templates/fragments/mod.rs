mod daily_table;
mod forecast_table;
mod hourly_table;
mod trend_chart;

pub use daily_table::{daily_table, daily_table_body};
pub use forecast_table::{forecast_table, forecast_table_body};
pub use hourly_table::{hourly_table, hourly_table_body};
pub use trend_chart::{daily_chart, forecast_chart};

use maud::{html, Markup};

/// Shared notice for a section whose data source is not available yet
pub(crate) fn unavailable_notice(reason: &str, hint: &str) -> Markup {
    html! {
        div class="notification is-warning is-light" {
            p { (reason) }
            p class="is-size-7" { (hint) }
        }
    }
}
