//! Reverse geocoding through Nominatim.

use serde::Deserialize;
use tracing::warn;

use super::Coordinates;
use crate::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Shown when no usable place name is available.
pub const UNKNOWN_AREA: &str = "Unknown area";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub state_district: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
}

/// The subset of a Nominatim `jsonv2` reverse response we use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseGeocode {
    #[serde(default)]
    pub address: Address,
    pub display_name: Option<String>,
}

impl ReverseGeocode {
    /// Most specific settlement name, widening to district, state, county and
    /// finally the full display name.
    pub fn area_name(&self) -> String {
        let a = &self.address;
        [
            &a.city,
            &a.town,
            &a.village,
            &a.hamlet,
            &a.state_district,
            &a.state,
            &a.county,
            &self.display_name,
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AREA.to_owned())
    }
}

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl GeocodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        // Nominatim rejects requests without an identifying user agent.
        let client = reqwest::Client::builder()
            .user_agent(concat!("krishi-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base.trim_end_matches('/').to_owned(),
        }
    }

    pub async fn reverse(&self, at: Coordinates) -> Result<ReverseGeocode, ClientError> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.base_url, at.lat, at.lon
        );
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Area name for `at`, or [`UNKNOWN_AREA`] when the lookup fails.
    pub async fn area_name(&self, at: Coordinates) -> String {
        match self.reverse(at).await {
            Ok(place) => place.area_name(),
            Err(e) => {
                warn!(error = %e, lat = at.lat, lon = at.lon, "reverse geocoding failed");
                UNKNOWN_AREA.to_owned()
            }
        }
    }
}
