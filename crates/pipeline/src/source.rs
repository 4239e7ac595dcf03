use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use slog::{debug, info, Logger};
use std::time::Duration;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

use crate::store::Observation;

pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Hourly variables requested from the archive, in response order
const HOURLY_VARIABLES: &str = "temperature_2m,relativehumidity_2m,precipitation,windspeed_10m";

/// Timestamps in the archive response: naive local time, minute precision
const API_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("weather source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("malformed response from weather source: {0}")]
    MalformedResponse(String),
}

/// Location and closed date range for one archive request
#[derive(Debug, Clone)]
pub struct ArchiveQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub timezone: String,
}

#[derive(Deserialize, Debug)]
struct ArchiveResponse {
    hourly: Option<HourlyBlock>,
}

/// Parallel arrays under the `hourly` key; individual values may be null
#[derive(Deserialize, Debug)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Option<Vec<Option<f64>>>,
    relativehumidity_2m: Option<Vec<Option<f64>>>,
    precipitation: Option<Vec<Option<f64>>>,
    windspeed_10m: Option<Vec<Option<f64>>>,
}

/// Client for the Open-Meteo historical archive endpoint
pub struct ArchiveClient {
    logger: Logger,
    base_url: String,
    client: ClientWithMiddleware,
}

impl ArchiveClient {
    pub fn new(logger: Logger, base_url: String) -> Result<Self, Error> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(
            Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| Error::SourceUnavailable(e.to_string()))?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            logger,
            base_url,
            client,
        })
    }

    /// Fetch one observation per hour over the closed date range
    pub async fn fetch_hourly(&self, query: &ArchiveQuery) -> Result<Vec<Observation>, Error> {
        let start = query
            .start_date
            .format(&DATE_FORMAT)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;
        let end = query
            .end_date
            .format(&DATE_FORMAT)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        debug!(self.logger, "requesting archive window";
            "start" => &start, "end" => &end,
            "lat" => query.latitude, "lon" => query.longitude);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", query.latitude.to_string()),
                ("longitude", query.longitude.to_string()),
                ("start_date", start),
                ("end_date", end),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("timezone", query.timezone.clone()),
            ])
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("error sending request: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "archive returned status {}",
                response.status()
            )));
        }

        let body: ArchiveResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("error decoding body: {}", e)))?;

        let observations = parse_hourly(body)?;
        info!(self.logger, "fetched archive window";
            "observations" => observations.len());
        Ok(observations)
    }
}

/// Zip the parallel arrays into observations, rejecting any shape mismatch
fn parse_hourly(body: ArchiveResponse) -> Result<Vec<Observation>, Error> {
    let hourly = body
        .hourly
        .ok_or_else(|| Error::MalformedResponse("missing `hourly` key".to_string()))?;

    let n = hourly.time.len();
    let temperature = require_variable(hourly.temperature_2m, "temperature_2m", n)?;
    let humidity = require_variable(hourly.relativehumidity_2m, "relativehumidity_2m", n)?;
    let precipitation = require_variable(hourly.precipitation, "precipitation", n)?;
    let wind_speed = require_variable(hourly.windspeed_10m, "windspeed_10m", n)?;

    let collected_at = OffsetDateTime::now_utc();
    let mut observations = Vec::with_capacity(n);
    for (i, raw_time) in hourly.time.iter().enumerate() {
        let time = PrimitiveDateTime::parse(raw_time, &API_TIME_FORMAT).map_err(|e| {
            Error::MalformedResponse(format!("unparseable timestamp {:?}: {}", raw_time, e))
        })?;

        observations.push(Observation {
            time,
            temperature_2m: temperature[i],
            relativehumidity_2m: humidity[i],
            precipitation: precipitation[i],
            windspeed_10m: wind_speed[i],
            collected_at,
        });
    }

    Ok(observations)
}

fn require_variable(
    values: Option<Vec<Option<f64>>>,
    name: &str,
    expected_len: usize,
) -> Result<Vec<Option<f64>>, Error> {
    let values =
        values.ok_or_else(|| Error::MalformedResponse(format!("missing `{}` array", name)))?;
    if values.len() != expected_len {
        return Err(Error::MalformedResponse(format!(
            "`{}` has {} entries, expected {}",
            name,
            values.len(),
            expected_len
        )));
    }
    Ok(values)
}
