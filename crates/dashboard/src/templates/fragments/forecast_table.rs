use maud::{html, Markup};
use meteo_trends_core::ForecastArtifact;

use super::{trend_chart::forecast_chart, unavailable_notice};

/// Forecast fragment, hours past the training cutoff with uncertainty bounds
pub fn forecast_table(forecast: &Result<Option<ForecastArtifact>, String>) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5" { "Temperature Forecast" }
            div id="forecast-table-container"
                hx-get="/fragments/forecast"
                hx-trigger="every 300s"
                hx-swap="innerHTML" {
                (forecast_table_body(forecast))
            }
        }
    }
}

pub fn forecast_table_body(forecast: &Result<Option<ForecastArtifact>, String>) -> Markup {
    let artifact = match forecast {
        Ok(Some(artifact)) => artifact,
        Ok(None) => {
            return html! {
                div class="has-text-centered has-text-grey py-4" {
                    p { "No forecast has been trained yet." }
                    p class="is-size-7" { "Run the pipeline's train stage to produce one." }
                }
            }
        }
        Err(reason) => {
            return unavailable_notice("The forecast could not be loaded.", reason)
        }
    };

    html! {
        p class="is-size-7 has-text-grey mb-3" {
            (format!("{} hours ahead of {}", artifact.horizon, artifact.cutoff))
            " · "
            span class="local-time" data-utc=(artifact.generated_at.clone()) {
                (format!("trained at {}", artifact.generated_at))
            }
        }
        (forecast_chart(artifact))
        div class="table-container" {
            table class="table is-fullwidth is-striped is-hoverable" {
                thead {
                    tr {
                        th { "Time" }
                        th class="has-text-right" { "Predicted" }
                        th class="has-text-right" { "Lower" }
                        th class="has-text-right" { "Upper" }
                    }
                }
                tbody {
                    @for point in &artifact.points {
                        tr {
                            td { (point.ds.clone()) }
                            td class="has-text-right" {
                                span class="weather-value" { (format!("{:.1}°C", point.yhat)) }
                            }
                            td class="has-text-right has-text-grey" { (format!("{:.1}°C", point.yhat_lower)) }
                            td class="has-text-right has-text-grey" { (format!("{:.1}°C", point.yhat_upper)) }
                        }
                    }
                }
            }
        }
    }
}
