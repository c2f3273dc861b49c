use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::RenderConfig;

pub const OPENWEATHERMAP_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse forecast: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No location configured (set OWM_LAT and OWM_LON)")]
    MissingLocation,

    #[error("Forecast contains no data points")]
    Empty,

    #[error("Invalid forecast timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Conditions at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPoint {
    pub time: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f64,
    /// Cloud cover, percent
    pub clouds: u8,
    /// Metres per second
    pub wind_speed: f64,
    /// Precipitation over the forecast step, millimetres
    pub rain_mm: f64,
    pub snow_mm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub current: WeatherPoint,
    pub forecast: Vec<WeatherPoint>,
}

impl WeatherSnapshot {
    /// Current conditions followed by the forecast
    pub fn points(&self) -> impl Iterator<Item = &WeatherPoint> {
        std::iter::once(&self.current).chain(self.forecast.iter())
    }

    pub fn temperature_range(&self) -> (f64, f64) {
        self.points()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.temperature), hi.max(p.temperature))
            })
    }
}

/// Where forecasts come from
pub trait WeatherSource {
    fn fetch(&self, config: &RenderConfig) -> Result<WeatherSnapshot, WeatherError>;
}

/// OpenWeatherMap 5 day / 3 hour forecast client
pub struct OpenWeatherMap {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OpenWeatherMap {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_base_url(OPENWEATHERMAP_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("landscape-ink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl WeatherSource for OpenWeatherMap {
    fn fetch(&self, config: &RenderConfig) -> Result<WeatherSnapshot, WeatherError> {
        let location = config.location.ok_or(WeatherError::MissingLocation)?;
        let url = format!("{}/data/2.5/forecast", self.base_url);

        tracing::debug!(
            url = %url,
            lat = location.latitude,
            lon = location.longitude,
            "Fetching forecast"
        );

        let body = self
            .client
            .get(&url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("appid", config.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        let snapshot = parse_forecast(&body)?;
        tracing::info!(
            points = snapshot.forecast.len() + 1,
            temperature = snapshot.current.temperature,
            "Fetched forecast"
        );
        Ok(snapshot)
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastItem>,
}

#[derive(Deserialize)]
struct ForecastItem {
    dt: i64,
    main: MainBlock,
    #[serde(default)]
    clouds: Option<CloudsBlock>,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    rain: Option<PrecipitationBlock>,
    #[serde(default)]
    snow: Option<PrecipitationBlock>,
}

#[derive(Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Deserialize)]
struct CloudsBlock {
    all: u8,
}

#[derive(Deserialize)]
struct WindBlock {
    speed: f64,
}

#[derive(Deserialize)]
struct PrecipitationBlock {
    #[serde(rename = "3h", default)]
    three_hours: f64,
}

impl TryFrom<ForecastItem> for WeatherPoint {
    type Error = WeatherError;

    fn try_from(item: ForecastItem) -> Result<Self, Self::Error> {
        let time =
            DateTime::from_timestamp(item.dt, 0).ok_or(WeatherError::InvalidTimestamp(item.dt))?;
        Ok(WeatherPoint {
            time,
            temperature: item.main.temp,
            clouds: item.clouds.map(|c| c.all.min(100)).unwrap_or(0),
            wind_speed: item.wind.map(|w| w.speed).unwrap_or(0.0),
            rain_mm: item.rain.map(|r| r.three_hours).unwrap_or(0.0),
            snow_mm: item.snow.map(|s| s.three_hours).unwrap_or(0.0),
        })
    }
}

/// Parse a `/data/2.5/forecast` response. The first entry is taken as the
/// current conditions.
pub fn parse_forecast(json: &str) -> Result<WeatherSnapshot, WeatherError> {
    let response: ForecastResponse = serde_json::from_str(json)?;
    let mut points = response
        .list
        .into_iter()
        .map(WeatherPoint::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if points.is_empty() {
        return Err(WeatherError::Empty);
    }
    let current = points.remove(0);
    Ok(WeatherSnapshot {
        current,
        forecast: points,
    })
}
