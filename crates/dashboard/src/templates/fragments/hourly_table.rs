use maud::{html, Markup};

use crate::db::HourlyTrend;

use super::unavailable_notice;

/// Hourly means fragment, newest hour first
pub fn hourly_table(hourly: &Result<Vec<HourlyTrend>, String>) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5" { "Hourly Means" }
            div id="hourly-table-container"
                hx-get="/fragments/hourly"
                hx-trigger="every 300s"
                hx-swap="innerHTML" {
                (hourly_table_body(hourly))
            }
        }
    }
}

/// Just the table - used for HTMX partial updates
pub fn hourly_table_body(hourly: &Result<Vec<HourlyTrend>, String>) -> Markup {
    let rows = match hourly {
        Ok(rows) => rows,
        Err(reason) => {
            return unavailable_notice(
                "Hourly aggregates are not available yet.",
                reason,
            )
        }
    };

    html! {
        @if rows.is_empty() {
            div class="has-text-centered has-text-grey py-4" {
                p { "No hourly aggregates yet." }
                p class="is-size-7" { "Run the pipeline's aggregate stage to populate them." }
            }
        } @else {
            div class="table-container" {
                table class="table is-fullwidth is-striped is-hoverable" {
                    thead {
                        tr {
                            th { "Date" }
                            th class="has-text-right" { "Hour" }
                            th class="has-text-right" { "Mean" }
                            th class="has-text-right" { "Min" }
                            th class="has-text-right" { "Max" }
                        }
                    }
                    tbody {
                        @for row in rows {
                            tr {
                                td { (row.date.clone()) }
                                td class="has-text-right" { (format!("{:02}h", row.hour)) }
                                td class="has-text-right" {
                                    span class="weather-value" { (format!("{:.1}°C", row.media_temp)) }
                                }
                                td class="has-text-right" { (format!("{:.1}°C", row.min_temp)) }
                                td class="has-text-right" { (format!("{:.1}°C", row.max_temp)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
