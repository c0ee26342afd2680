//! Weather and location context for the farmer's field.
//!
//! Both lookups are read-only calls to public services (Open-Meteo and
//! Nominatim). Nothing here is required for chatting; it feeds the side panel
//! of a front end.

pub mod geocode;
pub mod weather;

use serde::{Deserialize, Serialize};

pub use geocode::{GeocodeClient, ReverseGeocode, UNKNOWN_AREA};
pub use weather::{DailyWeather, WeatherClient, WeatherOutlook};

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Everything the side panel shows for one location.
#[derive(Debug, Clone)]
pub struct FieldReport {
    pub coordinates: Coordinates,
    pub area: String,
    /// `None` when the forecast could not be fetched.
    pub weather: Option<DailyWeather>,
    pub outlook: WeatherOutlook,
}

impl FieldReport {
    /// Fetch forecast and area name concurrently. Lookup failures degrade to
    /// an unknown outlook or [`UNKNOWN_AREA`] rather than an error.
    pub async fn fetch(
        weather: &WeatherClient,
        geocode: &GeocodeClient,
        coordinates: Coordinates,
    ) -> Self {
        let (daily, area) = tokio::join!(
            weather.daily(coordinates),
            geocode.area_name(coordinates)
        );

        let daily = match daily {
            Ok(daily) => Some(daily),
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch weather data");
                None
            }
        };
        let outlook = daily
            .as_ref()
            .map(WeatherOutlook::from_daily)
            .unwrap_or(WeatherOutlook::Unknown);

        Self {
            coordinates,
            area,
            weather: daily,
            outlook,
        }
    }
}
