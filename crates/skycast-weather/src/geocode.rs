//! Reverse geocoding: convert coordinates to human-readable place names.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.
//!
//! Geocoding is best-effort: every failure degrades to the placeholder
//! name instead of failing the surrounding request.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::Coordinate;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Skycast/0.1.0 (https://github.com/skycast)";

/// Placeholder returned whenever no usable place name could be resolved.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    suburb: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Option<Client>,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new() -> Self {
        Self::new_with_base_url(NOMINATIM_URL)
    }

    /// Geocoder pointed at a custom base URL (used by tests against a mock server).
    pub fn new_with_base_url(base_url: &str) -> Self {
        let client = match Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("Failed to create geocoding client: {}", e);
                None
            }
        };

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a coordinate to a place name in the requested language.
    /// Never fails: any error yields [`UNKNOWN_LOCATION`].
    pub async fn place_name(&self, coordinate: Coordinate, language: &str) -> String {
        let Some(client) = &self.client else {
            return UNKNOWN_LOCATION.to_string();
        };

        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom=12&accept-language={}",
            self.base_url, coordinate.latitude, coordinate.longitude, language
        );

        let response = match client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return UNKNOWN_LOCATION.to_string();
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return UNKNOWN_LOCATION.to_string();
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return UNKNOWN_LOCATION.to_string();
            }
        };

        match Self::pick_name(body) {
            Some(name) => {
                tracing::info!("Reverse geocoded to: {}", name);
                name
            }
            None => UNKNOWN_LOCATION.to_string(),
        }
    }

    /// Prefer city > town > village > hamlet > suburb > municipality > county,
    /// falling back to the first segment of the display name.
    fn pick_name(body: NominatimResponse) -> Option<String> {
        let from_address = body.address.and_then(|addr| {
            addr.city
                .or(addr.town)
                .or(addr.village)
                .or(addr.hamlet)
                .or(addr.suburb)
                .or(addr.municipality)
                .or(addr.county)
        });

        from_address
            .or_else(|| {
                body.display_name
                    .as_deref()
                    .and_then(|d| d.split(',').next())
                    .map(|s| s.trim().to_string())
            })
            .filter(|name| !name.is_empty())
    }
}

impl Default for ReverseGeocoder {
    fn default() -> Self {
        Self::new()
    }
}
