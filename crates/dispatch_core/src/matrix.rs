//! Pluggable distance-matrix providers: trait abstraction over the
//! travel-time service.
//!
//! Two implementations, mirroring how routing backends are swapped elsewhere
//! in the stack:
//!
//! - **`google::GoogleMatrixProvider`** (feature `google`): batched lookups
//!   against the Google Distance Matrix HTTP API.
//! - **`TableMatrixProvider`**: in-memory table keyed by coordinate pair,
//!   used by tests and offline runs.
//!
//! A provider returns one [`ModeMetric`] per origin, order-aligned with the
//! request. A pair the service cannot route comes back as
//! [`ModeMetric::Unavailable`] — a valid outcome, not an error. Only
//! whole-call failures surface as [`MatrixError`].

use h3o::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Travel mode requested from the matrix service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelMode {
    Driving,
    Walking,
}

impl TravelMode {
    pub fn as_param(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
        }
    }
}

/// Unit system for the human-readable distance strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn as_param(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
        }
    }
}

/// Travel distance and duration for one origin/destination pair, or the
/// explicit outcome that the service had no route for the pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeMetric {
    Route {
        distance_text: String,
        duration_text: String,
        duration_secs: u64,
    },
    Unavailable,
}

impl ModeMetric {
    pub fn is_available(&self) -> bool {
        matches!(self, ModeMetric::Route { .. })
    }

    /// Duration in seconds, `None` when the pair was unroutable. Ranking
    /// treats `None` as slower than any computable duration.
    pub fn duration_secs(&self) -> Option<u64> {
        match self {
            ModeMetric::Route { duration_secs, .. } => Some(*duration_secs),
            ModeMetric::Unavailable => None,
        }
    }
}

/// Errors for a whole matrix call. Per-pair failures are not errors; they
/// surface as [`ModeMetric::Unavailable`] in the result rows.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatrixError {
    #[error("distance matrix request failed: {0}")]
    Http(String),
    #[error("distance matrix response could not be decoded: {0}")]
    Json(String),
    #[error("distance matrix rejected the request: {0}")]
    Api(String),
    #[error("distance matrix returned {got} rows for {expected} origins")]
    ShapeMismatch { expected: usize, got: usize },
}

/// Trait for travel-time backends. Implementations must be `Send + Sync` so
/// a provider can be shared with a session's fetch worker.
pub trait MatrixProvider: Send + Sync {
    /// Batched lookup: one element per origin, order-aligned with `origins`,
    /// all against the single `destination`.
    fn travel_times(
        &self,
        origins: &[LatLng],
        destination: LatLng,
        mode: TravelMode,
        units: UnitSystem,
    ) -> Result<Vec<ModeMetric>, MatrixError>;
}

// ---------------------------------------------------------------------------
// Table provider (always available)
// ---------------------------------------------------------------------------

/// Coordinate key with microdegree precision, good enough to identify a
/// member address or incident location in a lookup table.
pub(crate) fn coord_key(point: LatLng) -> (i64, i64) {
    (
        (point.lat() * 1e6).round() as i64,
        (point.lng() * 1e6).round() as i64,
    )
}

/// In-memory matrix provider for tests and offline runs.
///
/// Pairs absent from the table come back [`ModeMetric::Unavailable`]. An
/// outage message, when set, fails every call the way a transport or quota
/// error from the real service would.
#[derive(Default)]
pub struct TableMatrixProvider {
    routes: std::collections::HashMap<(TravelMode, (i64, i64), (i64, i64)), ModeMetric>,
    outage: Option<String>,
}

impl TableMatrixProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        mode: TravelMode,
        origin: LatLng,
        destination: LatLng,
        metric: ModeMetric,
    ) {
        self.routes
            .insert((mode, coord_key(origin), coord_key(destination)), metric);
    }

    /// Shorthand for a routable pair with synthesized display strings.
    pub fn insert_route(
        &mut self,
        mode: TravelMode,
        origin: LatLng,
        destination: LatLng,
        duration_secs: u64,
        distance_text: &str,
    ) {
        self.insert(
            mode,
            origin,
            destination,
            ModeMetric::Route {
                distance_text: distance_text.to_string(),
                duration_text: format!("{} mins", duration_secs.div_ceil(60)),
                duration_secs,
            },
        );
    }

    pub fn set_outage(&mut self, message: &str) {
        self.outage = Some(message.to_string());
    }
}

impl MatrixProvider for TableMatrixProvider {
    fn travel_times(
        &self,
        origins: &[LatLng],
        destination: LatLng,
        mode: TravelMode,
        _units: UnitSystem,
    ) -> Result<Vec<ModeMetric>, MatrixError> {
        if let Some(message) = &self.outage {
            return Err(MatrixError::Api(message.clone()));
        }
        let destination_key = coord_key(destination);
        Ok(origins
            .iter()
            .map(|origin| {
                self.routes
                    .get(&(mode, coord_key(*origin), destination_key))
                    .cloned()
                    .unwrap_or(ModeMetric::Unavailable)
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Google Distance Matrix provider (behind `google` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "google")]
pub mod google {
    use super::*;
    use log::debug;
    use reqwest::blocking::Client;
    use std::time::Duration;

    const ENDPOINT: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Thin HTTP client for the Google Distance Matrix API.
    pub struct GoogleMatrixProvider {
        client: Client,
        api_key: String,
        endpoint: String,
    }

    impl GoogleMatrixProvider {
        pub fn new(api_key: &str) -> Self {
            Self::with_timeout(api_key, DEFAULT_TIMEOUT)
        }

        /// Bounded request timeout; there are no retries at this layer.
        pub fn with_timeout(api_key: &str, timeout: Duration) -> Self {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build matrix client");
            Self {
                client,
                api_key: api_key.to_string(),
                endpoint: ENDPOINT.to_string(),
            }
        }

        /// Endpoint override for tests pointed at a stub server.
        pub fn with_endpoint(mut self, endpoint: &str) -> Self {
            self.endpoint = endpoint.trim_end_matches('/').to_string();
            self
        }
    }

    impl MatrixProvider for GoogleMatrixProvider {
        fn travel_times(
            &self,
            origins: &[LatLng],
            destination: LatLng,
            mode: TravelMode,
            units: UnitSystem,
        ) -> Result<Vec<ModeMetric>, MatrixError> {
            let origins_param = origins
                .iter()
                .map(|origin| format!("{:.6},{:.6}", origin.lat(), origin.lng()))
                .collect::<Vec<_>>()
                .join("|");
            let destination_param =
                format!("{:.6},{:.6}", destination.lat(), destination.lng());

            debug!(
                "distance matrix lookup: {} origins, mode {}",
                origins.len(),
                mode.as_param()
            );

            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("origins", origins_param.as_str()),
                    ("destinations", destination_param.as_str()),
                    ("mode", mode.as_param()),
                    ("units", units.as_param()),
                    ("key", self.api_key.as_str()),
                ])
                .send()
                .map_err(|err| MatrixError::Http(err.to_string()))?;

            let parsed: MatrixResponse = response
                .json()
                .map_err(|err| MatrixError::Json(err.to_string()))?;
            parse_matrix_response(parsed, origins.len())
        }
    }

    #[derive(Deserialize)]
    pub(super) struct MatrixResponse {
        pub(super) status: String,
        #[serde(default)]
        pub(super) rows: Vec<MatrixRow>,
        pub(super) error_message: Option<String>,
    }

    #[derive(Deserialize)]
    pub(super) struct MatrixRow {
        pub(super) elements: Vec<MatrixElement>,
    }

    #[derive(Deserialize)]
    pub(super) struct MatrixElement {
        pub(super) status: String,
        pub(super) distance: Option<TextValue>,
        pub(super) duration: Option<TextValue>,
    }

    #[derive(Deserialize)]
    pub(super) struct TextValue {
        pub(super) text: String,
        pub(super) value: u64,
    }

    pub(super) fn parse_matrix_response(
        response: MatrixResponse,
        expected: usize,
    ) -> Result<Vec<ModeMetric>, MatrixError> {
        if response.status != "OK" {
            let message = response
                .error_message
                .unwrap_or_else(|| response.status.clone());
            return Err(MatrixError::Api(message));
        }
        if response.rows.len() != expected {
            return Err(MatrixError::ShapeMismatch {
                expected,
                got: response.rows.len(),
            });
        }

        // One destination per request, so each row carries one element.
        Ok(response
            .rows
            .into_iter()
            .map(|row| {
                let element = match row.elements.into_iter().next() {
                    Some(element) if element.status == "OK" => element,
                    _ => return ModeMetric::Unavailable,
                };
                match (element.distance, element.duration) {
                    (Some(distance), Some(duration)) => ModeMetric::Route {
                        distance_text: distance.text,
                        duration_text: duration.text,
                        duration_secs: duration.value,
                    },
                    _ => ModeMetric::Unavailable,
                }
            })
            .collect())
    }

}
