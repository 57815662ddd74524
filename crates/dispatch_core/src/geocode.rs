//! Geocoding seam: resolve a free-text incident address to a coordinate.
//!
//! - **`google::GoogleGeocoder`** (feature `google`): single-result lookup
//!   against the Google Geocoding HTTP API, with region bias and country
//!   restriction passed through from configuration.
//! - **`FixedGeocoder`**: in-memory table for tests and offline runs.
//! - **`CachedGeocoder`**: LRU wrapper around any [`Geocoder`]; only
//!   successful resolutions are cached.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use h3o::LatLng;
use log::debug;
use lru::LruCache;
use thiserror::Error;

/// A resolved address: the coordinate plus the service's canonical rendering
/// of what it matched.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub coordinate: LatLng,
    pub formatted_address: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeocodeError {
    /// The service answered but had no result for the address.
    #[error("address not found")]
    NotFound,
    #[error("geocoding request failed: {0}")]
    Http(String),
    #[error("geocoding response could not be decoded: {0}")]
    Json(String),
    #[error("geocoding rejected the request: {0}")]
    Api(String),
}

/// Trait for address resolution backends. `Send + Sync` so a geocoder can be
/// shared with a session's worker thread.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError>;
}

// ---------------------------------------------------------------------------
// Fixed provider (always available)
// ---------------------------------------------------------------------------

/// Table-backed geocoder. Addresses absent from the table resolve to
/// [`GeocodeError::NotFound`]; an outage message fails every call instead.
#[derive(Default)]
pub struct FixedGeocoder {
    entries: HashMap<String, GeocodedAddress>,
    outage: Option<String>,
}

impl FixedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: &str, coordinate: LatLng, formatted_address: &str) {
        self.entries.insert(
            address.to_string(),
            GeocodedAddress {
                coordinate,
                formatted_address: formatted_address.to_string(),
            },
        );
    }

    pub fn set_outage(&mut self, message: &str) {
        self.outage = Some(message.to_string());
    }
}

impl Geocoder for FixedGeocoder {
    fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        if let Some(message) = &self.outage {
            return Err(GeocodeError::Http(message.clone()));
        }
        self.entries
            .get(address)
            .cloned()
            .ok_or(GeocodeError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

const DEFAULT_GEOCODE_CACHE_CAPACITY: usize = 256;

/// LRU-cached wrapper around any [`Geocoder`], keyed by the raw address
/// text. Failures are not cached (a retyped submit retries the service).
pub struct CachedGeocoder {
    inner: Box<dyn Geocoder>,
    cache: Mutex<LruCache<String, GeocodedAddress>>,
}

impl CachedGeocoder {
    pub fn new(inner: Box<dyn Geocoder>) -> Self {
        Self::with_capacity(inner, DEFAULT_GEOCODE_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: Box<dyn Geocoder>, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be > 0"),
            )),
        }
    }
}

impl Geocoder for CachedGeocoder {
    fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(resolved) = cache.get(address) {
                debug!("geocode cache hit for {:?}", address);
                return Ok(resolved.clone());
            }
        }

        let resolved = self.inner.geocode(address)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(address.to_string(), resolved.clone());
        }
        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// Google Geocoding provider (behind `google` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "google")]
pub mod google {
    use super::*;
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use std::time::Duration;

    const ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Thin HTTP client for the Google Geocoding API.
    ///
    /// Region bias and country restriction come from configuration and are
    /// passed through to the API untouched; the first (best) result wins.
    pub struct GoogleGeocoder {
        client: Client,
        api_key: String,
        endpoint: String,
        region: Option<String>,
        country: Option<String>,
    }

    impl GoogleGeocoder {
        pub fn new(api_key: &str) -> Self {
            let client = Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("failed to build geocoding client");
            Self {
                client,
                api_key: api_key.to_string(),
                endpoint: ENDPOINT.to_string(),
                region: None,
                country: None,
            }
        }

        /// ccTLD region bias, e.g. `"us"`.
        pub fn with_region(mut self, region: &str) -> Self {
            self.region = Some(region.to_string());
            self
        }

        /// Restrict results to one country, e.g. `"US"`.
        pub fn with_country(mut self, country: &str) -> Self {
            self.country = Some(country.to_string());
            self
        }

        /// Endpoint override for tests pointed at a stub server.
        pub fn with_endpoint(mut self, endpoint: &str) -> Self {
            self.endpoint = endpoint.trim_end_matches('/').to_string();
            self
        }
    }

    impl Geocoder for GoogleGeocoder {
        fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
            debug!("geocoding {:?}", address);

            let mut query: Vec<(&str, String)> = vec![
                ("address", address.to_string()),
                ("key", self.api_key.clone()),
            ];
            if let Some(region) = &self.region {
                query.push(("region", region.clone()));
            }
            if let Some(country) = &self.country {
                query.push(("components", format!("country:{country}")));
            }

            let response = self
                .client
                .get(&self.endpoint)
                .query(&query)
                .send()
                .map_err(|err| GeocodeError::Http(err.to_string()))?;

            let parsed: GeocodeResponse = response
                .json()
                .map_err(|err| GeocodeError::Json(err.to_string()))?;
            parse_geocode_response(parsed)
        }
    }

    #[derive(Deserialize)]
    pub(super) struct GeocodeResponse {
        pub(super) status: String,
        #[serde(default)]
        pub(super) results: Vec<GeocodeResult>,
        pub(super) error_message: Option<String>,
    }

    #[derive(Deserialize)]
    pub(super) struct GeocodeResult {
        pub(super) formatted_address: String,
        pub(super) geometry: Geometry,
    }

    #[derive(Deserialize)]
    pub(super) struct Geometry {
        pub(super) location: Location,
    }

    #[derive(Deserialize)]
    pub(super) struct Location {
        pub(super) lat: f64,
        pub(super) lng: f64,
    }

    pub(super) fn parse_geocode_response(
        response: GeocodeResponse,
    ) -> Result<GeocodedAddress, GeocodeError> {
        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(GeocodeError::NotFound),
            status => {
                let message = response
                    .error_message
                    .unwrap_or_else(|| status.to_string());
                return Err(GeocodeError::Api(message));
            }
        }

        let result = response
            .results
            .into_iter()
            .next()
            .ok_or(GeocodeError::NotFound)?;
        let coordinate = LatLng::new(result.geometry.location.lat, result.geometry.location.lng)
            .map_err(|_| GeocodeError::Api("coordinate out of range".to_string()))?;
        Ok(GeocodedAddress {
            coordinate,
            formatted_address: result.formatted_address,
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn response_from_json(raw: &str) -> GeocodeResponse {
            serde_json::from_str(raw).expect("valid geocode response JSON")
        }

        #[test]
        fn parse_takes_first_result() {
            let response = response_from_json(
                r#"{
                    "status": "OK",
                    "results": [
                        {"formatted_address": "12 Garfield Rd, Monroe, NY",
                         "geometry": {"location": {"lat": 41.340992, "lng": -74.168008}}},
                        {"formatted_address": "elsewhere",
                         "geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
                    ]
                }"#,
            );
            let resolved = parse_geocode_response(response).expect("should parse");
            assert_eq!(resolved.formatted_address, "12 Garfield Rd, Monroe, NY");
            assert!((resolved.coordinate.lat() - 41.340992).abs() < 1e-9);
        }

        #[test]
        fn parse_maps_zero_results_to_not_found() {
            let response =
                response_from_json(r#"{"status": "ZERO_RESULTS", "results": []}"#);
            assert_eq!(
                parse_geocode_response(response).expect_err("should fail"),
                GeocodeError::NotFound
            );
        }

        #[test]
        fn parse_maps_other_statuses_to_api_error() {
            let response = response_from_json(
                r#"{"status": "REQUEST_DENIED", "results": [],
                    "error_message": "key rejected"}"#,
            );
            assert_eq!(
                parse_geocode_response(response).expect_err("should fail"),
                GeocodeError::Api("key rejected".to_string())
            );
        }
    }
}
