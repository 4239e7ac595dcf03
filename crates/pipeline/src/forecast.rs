//! Trains the hourly temperature forecast on the aggregated series.
//!
//! Uses MSTL (daily seasonal decomposition, period 24) around an AutoETS
//! trend model when at least two full days of aggregates exist, and plain
//! AutoETS below that. Gaps in the hourly series become NaN and are handled
//! by a linear interpolation transform before fitting.

use augurs::{
    ets::AutoETS,
    forecaster::{transforms::LinearInterpolator, Forecaster, Transformer},
    mstl::MSTLModel,
};
use meteo_trends_core::{ArtifactStore, ForecastArtifact, ForecastPoint};
use slog::{info, Logger};
use time::{macros::format_description, Date, Duration, PrimitiveDateTime, Time};

use crate::{
    aggregate::{hourly_aggregates, HourlyAggregate},
    store::{Store, STORE_TIME_FORMAT},
};

/// Need at least one full day of hourly aggregates to fit anything
pub const MIN_TRAINING_POINTS: usize = 24;

/// Two full days before the daily seasonal component is worth modeling
const MIN_SEASONAL_POINTS: usize = 48;

/// Hours per seasonal cycle
const DAILY_PERIOD: usize = 24;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("insufficient training data: need at least {MIN_TRAINING_POINTS} hourly points, got {0}")]
    InsufficientData(usize),
    #[error("forecast model error: {0}")]
    Model(String),
    #[error("failed to read hourly aggregate: {0}")]
    Aggregate(#[from] crate::aggregate::Error),
    #[error("failed to parse aggregate timestamp: {0}")]
    TimeParse(#[from] time::error::Parse),
    #[error("invalid hour value in aggregate: {0}")]
    InvalidHour(i64),
    #[error("failed to persist forecast artifact: {0}")]
    Artifact(#[from] meteo_trends_core::artifact::Error),
}

/// Train on the hourly aggregate, predict `horizon` hours past the cutoff,
/// and persist the result as the current artifact.
pub async fn run(
    store: &Store,
    artifacts: &ArtifactStore,
    horizon: usize,
    logger: &Logger,
) -> Result<ForecastArtifact, Error> {
    let aggregates = hourly_aggregates(store).await?;
    let (values, cutoff) = prepare_series(&aggregates)?;

    if values.len() < MIN_TRAINING_POINTS {
        return Err(Error::InsufficientData(values.len()));
    }

    let use_seasonal = values.len() >= MIN_SEASONAL_POINTS;
    info!(logger, "training forecast model";
        "points" => values.len(), "seasonal" => use_seasonal, "horizon" => horizon);

    let forecast = if use_seasonal {
        predict_with_mstl(&values, horizon)?
    } else {
        predict_with_ets(&values, horizon)?
    };

    let points = into_points(&forecast, &values, cutoff, horizon);
    let artifact = ForecastArtifact::new(
        cutoff
            .format(&STORE_TIME_FORMAT)
            .map_err(|e| Error::Model(e.to_string()))?,
        horizon,
        CONFIDENCE_LEVEL,
        points,
    );

    let file_name = artifacts.save(&artifact)?;
    info!(logger, "forecast artifact written";
        "file" => file_name, "cutoff" => &artifact.cutoff);

    Ok(artifact)
}

/// Sorted hourly values with gaps filled as NaN, plus the cutoff timestamp
fn prepare_series(aggregates: &[HourlyAggregate]) -> Result<(Vec<f64>, PrimitiveDateTime), Error> {
    let mut stamped = Vec::with_capacity(aggregates.len());
    for row in aggregates {
        let date = Date::parse(&row.date, format_description!("[year]-[month]-[day]"))?;
        let hour =
            u8::try_from(row.hour).map_err(|_| Error::InvalidHour(row.hour))?;
        let time = Time::from_hms(hour, 0, 0).map_err(|_| Error::InvalidHour(row.hour))?;
        stamped.push((PrimitiveDateTime::new(date, time), row.media_temp));
    }
    stamped.sort_by_key(|(ds, _)| *ds);

    let Some(&(first, _)) = stamped.first() else {
        return Ok((Vec::new(), PrimitiveDateTime::MIN));
    };
    let (last, _) = *stamped.last().expect("non-empty");

    let mut values = Vec::new();
    let mut cursor = first;
    let mut iter = stamped.iter().peekable();
    while cursor <= last {
        match iter.peek() {
            Some(&&(ds, value)) if ds == cursor => {
                values.push(value);
                iter.next();
            }
            _ => values.push(f64::NAN),
        }
        cursor += Duration::HOUR;
    }

    Ok((values, last))
}

/// MSTL with daily seasonality around an AutoETS trend model
fn predict_with_mstl(values: &[f64], horizon: usize) -> Result<augurs::Forecast, Error> {
    let ets = AutoETS::non_seasonal().into_trend_model();
    let mstl = MSTLModel::new(vec![DAILY_PERIOD], ets);

    let transformers: Vec<Box<dyn Transformer>> = vec![Box::new(LinearInterpolator::default())];
    let mut forecaster = Forecaster::new(mstl).with_transformers(transformers);

    forecaster
        .fit(values)
        .map_err(|e| Error::Model(format!("MSTL fit error: {e}")))?;
    forecaster
        .predict(horizon, CONFIDENCE_LEVEL)
        .map_err(|e| Error::Model(format!("MSTL predict error: {e}")))
}

/// Plain AutoETS for short histories
fn predict_with_ets(values: &[f64], horizon: usize) -> Result<augurs::Forecast, Error> {
    let ets = AutoETS::non_seasonal();

    let transformers: Vec<Box<dyn Transformer>> = vec![Box::new(LinearInterpolator::default())];
    let mut forecaster = Forecaster::new(ets).with_transformers(transformers);

    forecaster
        .fit(values)
        .map_err(|e| Error::Model(format!("ETS fit error: {e}")))?;
    forecaster
        .predict(horizon, CONFIDENCE_LEVEL)
        .map_err(|e| Error::Model(format!("ETS predict error: {e}")))
}

/// Pair each predicted hour with its timestamp and uncertainty bounds.
/// When the model yields no intervals, fall back to a residual-free band of
/// ±1.96 sample standard deviations around the point forecast.
fn into_points(
    forecast: &augurs::Forecast,
    training: &[f64],
    cutoff: PrimitiveDateTime,
    horizon: usize,
) -> Vec<ForecastPoint> {
    let fallback_band = 1.96 * sample_std(training);

    let mut points = Vec::with_capacity(horizon);
    for (i, &yhat) in forecast.point.iter().take(horizon).enumerate() {
        let ds = cutoff + Duration::hours((i + 1) as i64);
        let (yhat_lower, yhat_upper) = match &forecast.intervals {
            Some(intervals) => (intervals.lower[i], intervals.upper[i]),
            None => (yhat - fallback_band, yhat + fallback_band),
        };
        points.push(ForecastPoint {
            ds: ds
                .format(&STORE_TIME_FORMAT)
                .unwrap_or_else(|_| ds.to_string()),
            yhat,
            yhat_lower,
            yhat_upper,
        });
    }
    points
}

fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return 0.0;
    }
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let variance =
        finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
    variance.sqrt()
}
