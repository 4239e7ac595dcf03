use maud::{html, Markup};
use meteo_trends_core::ForecastArtifact;

use crate::db::DailyTrend;

/// Fixed chart canvas; the SVG scales responsively through its viewBox
const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 220.0;

/// Room left for axis labels on every side
const MARGIN: f64 = 34.0;

/// Maps series indices and temperature values onto SVG pixel coordinates
struct ChartScale {
    min: f64,
    max: f64,
    len: usize,
}

impl ChartScale {
    /// Scale spanning every finite value of the given series.
    /// Returns `None` when there are not enough points to draw a line.
    fn spanning<'a>(series: impl Iterator<Item = &'a f64>, len: usize) -> Option<ChartScale> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &value in series {
            if value.is_finite() {
                min = min.min(value);
                max = max.max(value);
            }
        }
        if len < 2 || !min.is_finite() {
            return None;
        }
        // Flat series still get a visible band to sit in
        if (max - min).abs() < f64::EPSILON {
            min -= 1.0;
            max += 1.0;
        }
        Some(ChartScale { min, max, len })
    }

    fn x(&self, index: usize) -> f64 {
        MARGIN + (CHART_WIDTH - 2.0 * MARGIN) * index as f64 / (self.len - 1) as f64
    }

    fn y(&self, value: f64) -> f64 {
        CHART_HEIGHT
            - MARGIN
            - (CHART_HEIGHT - 2.0 * MARGIN) * (value - self.min) / (self.max - self.min)
    }

    /// `points` attribute for a polyline; non-finite values break the line
    fn polyline(&self, values: &[f64]) -> String {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| format!("{:.1},{:.1}", self.x(i), self.y(v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Closed `points` attribute for the area between two series
    fn band(&self, upper: &[f64], lower: &[f64]) -> String {
        let forward = upper
            .iter()
            .enumerate()
            .map(|(i, &v)| format!("{:.1},{:.1}", self.x(i), self.y(v)));
        let back = lower
            .iter()
            .enumerate()
            .rev()
            .map(|(i, &v)| format!("{:.1},{:.1}", self.x(i), self.y(v)));
        forward.chain(back).collect::<Vec<_>>().join(" ")
    }
}

fn chart_frame(scale: &ChartScale, first_label: &str, last_label: &str, body: Markup) -> Markup {
    html! {
        svg class="trend-chart" viewBox=(format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT))
            preserveAspectRatio="xMidYMid meet" role="img" {
            line class="chart-axis"
                x1=(format!("{:.1}", MARGIN)) y1=(format!("{:.1}", CHART_HEIGHT - MARGIN))
                x2=(format!("{:.1}", CHART_WIDTH - MARGIN)) y2=(format!("{:.1}", CHART_HEIGHT - MARGIN)) {}
            text class="chart-label" x="4" y=(format!("{:.1}", MARGIN)) {
                (format!("{:.0}°", scale.max))
            }
            text class="chart-label" x="4" y=(format!("{:.1}", CHART_HEIGHT - MARGIN)) {
                (format!("{:.0}°", scale.min))
            }
            text class="chart-label" x=(format!("{:.1}", MARGIN))
                y=(format!("{:.1}", CHART_HEIGHT - 10.0)) {
                (first_label)
            }
            text class="chart-label chart-label-end" x=(format!("{:.1}", CHART_WIDTH - MARGIN))
                y=(format!("{:.1}", CHART_HEIGHT - 10.0)) text-anchor="end" {
                (last_label)
            }
            (body)
        }
    }
}

/// Line chart of the daily mean temperature with the min/max envelope.
/// Renders nothing when fewer than two days exist.
pub fn daily_chart(daily: &[DailyTrend]) -> Markup {
    // Rows arrive newest first; the chart reads left to right in time
    let mut rows: Vec<&DailyTrend> = daily.iter().collect();
    rows.reverse();

    let media: Vec<f64> = rows.iter().map(|r| r.media_temp).collect();
    let min: Vec<f64> = rows.iter().map(|r| r.min_temp).collect();
    let max: Vec<f64> = rows.iter().map(|r| r.max_temp).collect();

    let Some(scale) = ChartScale::spanning(min.iter().chain(max.iter()), rows.len()) else {
        return html! {};
    };

    chart_frame(
        &scale,
        &rows[0].date,
        &rows[rows.len() - 1].date,
        html! {
            polygon class="chart-band" points=(scale.band(&max, &min)) {}
            polyline class="chart-line" points=(scale.polyline(&media)) {}
        },
    )
}

/// Line chart of the predicted temperature with its uncertainty band.
/// Renders nothing when the horizon is shorter than two hours.
pub fn forecast_chart(artifact: &ForecastArtifact) -> Markup {
    let yhat: Vec<f64> = artifact.points.iter().map(|p| p.yhat).collect();
    let lower: Vec<f64> = artifact.points.iter().map(|p| p.yhat_lower).collect();
    let upper: Vec<f64> = artifact.points.iter().map(|p| p.yhat_upper).collect();

    let Some(scale) = ChartScale::spanning(lower.iter().chain(upper.iter()), yhat.len()) else {
        return html! {};
    };

    chart_frame(
        &scale,
        &artifact.points[0].ds,
        &artifact.points[artifact.points.len() - 1].ds,
        html! {
            polygon class="chart-band" points=(scale.band(&upper, &lower)) {}
            polyline class="chart-line" points=(scale.polyline(&yhat)) {}
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_maps_extremes_onto_the_margins() {
        let values = [10.0, 30.0];
        let scale = ChartScale::spanning(values.iter(), 2).unwrap();

        assert_eq!(scale.x(0), MARGIN);
        assert_eq!(scale.x(1), CHART_WIDTH - MARGIN);
        assert_eq!(scale.y(30.0), MARGIN);
        assert_eq!(scale.y(10.0), CHART_HEIGHT - MARGIN);
    }

    #[test]
    fn single_point_yields_no_scale() {
        assert!(ChartScale::spanning([20.0].iter(), 1).is_none());
        assert!(ChartScale::spanning([].iter(), 0).is_none());
    }

    #[test]
    fn flat_series_is_widened_to_stay_visible() {
        let values = [20.0, 20.0, 20.0];
        let scale = ChartScale::spanning(values.iter(), 3).unwrap();
        assert!(scale.min < 20.0);
        assert!(scale.max > 20.0);
    }

    #[test]
    fn polyline_skips_non_finite_values() {
        let scale = ChartScale::spanning([10.0, 30.0].iter(), 3).unwrap();
        let points = scale.polyline(&[10.0, f64::NAN, 30.0]);
        assert_eq!(points.split(' ').count(), 2);
    }

    #[test]
    fn band_closes_back_along_the_lower_series() {
        let scale = ChartScale::spanning([0.0, 10.0].iter(), 2).unwrap();
        let band = scale.band(&[10.0, 10.0], &[0.0, 0.0]);
        // upper left, upper right, lower right, lower left
        let corners: Vec<&str> = band.split(' ').collect();
        assert_eq!(
            corners,
            vec!["34.0,34.0", "566.0,34.0", "566.0,186.0", "34.0,186.0"]
        );
    }
}
