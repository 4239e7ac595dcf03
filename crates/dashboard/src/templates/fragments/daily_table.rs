use maud::{html, Markup};

use crate::db::DailyTrend;

use super::{trend_chart::daily_chart, unavailable_notice};

/// Daily means fragment, newest day first
pub fn daily_table(daily: &Result<Vec<DailyTrend>, String>) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5" { "Daily Means" }
            div id="daily-table-container"
                hx-get="/fragments/daily"
                hx-trigger="every 300s"
                hx-swap="innerHTML" {
                (daily_table_body(daily))
            }
        }
    }
}

pub fn daily_table_body(daily: &Result<Vec<DailyTrend>, String>) -> Markup {
    let rows = match daily {
        Ok(rows) => rows,
        Err(reason) => {
            return unavailable_notice(
                "Daily aggregates are not available yet.",
                reason,
            )
        }
    };

    html! {
        @if rows.is_empty() {
            div class="has-text-centered has-text-grey py-4" {
                p { "No daily aggregates yet." }
                p class="is-size-7" { "Run the pipeline's aggregate stage to populate them." }
            }
        } @else {
            (daily_chart(rows))
            div class="table-container" {
                table class="table is-fullwidth is-striped is-hoverable" {
                    thead {
                        tr {
                            th { "Date" }
                            th class="has-text-right" { "Mean" }
                            th class="has-text-right" { "Min" }
                            th class="has-text-right" { "Max" }
                        }
                    }
                    tbody {
                        @for row in rows {
                            tr {
                                td { (row.date.clone()) }
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
