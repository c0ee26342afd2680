//! Daily forecast from Open-Meteo and the rule-of-thumb outlook derived from it.

use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

use super::Coordinates;
use crate::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

/// Days of history and of forecast requested around today.
const WINDOW_DAYS: u64 = 7;

/// Index of today in a window of `WINDOW_DAYS` past days plus the future ones.
const TODAY_INDEX: usize = WINDOW_DAYS as usize;

/// Daily series as returned by Open-Meteo. Values may be `null` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DailyWeather {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily: DailyWeather,
}

/// Coarse description of today's weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherOutlook {
    Rainy,
    Sunny,
    Cool,
    Cloudy,
    Unknown,
}

impl WeatherOutlook {
    /// Classify today's entry: more than 2 mm of rain is rainy, otherwise a
    /// maximum above 32 °C is sunny, otherwise a minimum below 18 °C is cool.
    pub fn from_daily(daily: &DailyWeather) -> Self {
        if daily.time.is_empty() {
            return WeatherOutlook::Unknown;
        }
        let today = |series: &[Option<f64>]| series.get(TODAY_INDEX).copied().flatten();

        if today(&daily.precipitation_sum).is_some_and(|rain| rain > 2.0) {
            WeatherOutlook::Rainy
        } else if today(&daily.temperature_2m_max).is_some_and(|t| t > 32.0) {
            WeatherOutlook::Sunny
        } else if today(&daily.temperature_2m_min).is_some_and(|t| t < 18.0) {
            WeatherOutlook::Cool
        } else {
            WeatherOutlook::Cloudy
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherOutlook::Rainy => "Rainy",
            WeatherOutlook::Sunny => "Sunny",
            WeatherOutlook::Cool => "Cool",
            WeatherOutlook::Cloudy => "Cloudy",
            WeatherOutlook::Unknown => "Unknown",
        }
    }

    /// What can be done in the field right now.
    pub fn field_suggestion(self) -> &'static str {
        match self {
            WeatherOutlook::Rainy => "Avoid field work, check drainage.",
            WeatherOutlook::Sunny => "Good day for planting or harvesting.",
            WeatherOutlook::Cool => "Monitor for pests, irrigate if needed.",
            WeatherOutlook::Cloudy | WeatherOutlook::Unknown => {
                "Suitable for general field activities."
            }
        }
    }

    /// Crops suited to the current conditions.
    pub fn crop_recommendation(self) -> &'static str {
        match self {
            WeatherOutlook::Rainy => "Paddy, Jute, Sugarcane",
            WeatherOutlook::Sunny => "Maize, Groundnut, Cotton",
            WeatherOutlook::Cool => "Wheat, Mustard, Barley",
            WeatherOutlook::Cloudy | WeatherOutlook::Unknown => "Vegetables, Pulses, Millets",
        }
    }
}

/// Open-Meteo forecast client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base.trim_end_matches('/').to_owned(),
        }
    }

    /// Daily series for the week before and after today (UTC).
    pub async fn daily(&self, at: Coordinates) -> Result<DailyWeather, ClientError> {
        self.daily_around(at, Utc::now().date_naive()).await
    }

    pub async fn daily_around(
        &self,
        at: Coordinates,
        today: NaiveDate,
    ) -> Result<DailyWeather, ClientError> {
        let response = self
            .client
            .get(forecast_url(&self.base_url, at, today))
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        let forecast: ForecastResponse = serde_json::from_slice(&bytes)?;
        Ok(forecast.daily)
    }
}

fn forecast_url(base_url: &str, at: Coordinates, today: NaiveDate) -> String {
    let start = today - Days::new(WINDOW_DAYS);
    let end = today + Days::new(WINDOW_DAYS);
    format!(
        "{base_url}/v1/forecast?latitude={lat}&longitude={lon}\
         &start_date={start}&end_date={end}\
         &daily=temperature_2m_max,temperature_2m_min,precipitation_sum&timezone=auto",
        lat = at.lat,
        lon = at.lon,
        start = start.format("%Y-%m-%d"),
        end = end.format("%Y-%m-%d"),
    )
}
