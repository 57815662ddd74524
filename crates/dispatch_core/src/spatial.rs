//! Geographic helpers: great-circle distance and the default map anchor.

use h3o::LatLng;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Coordinate the map view recenters on after a session reset (station house).
pub const DEFAULT_CENTER_LAT: f64 = 41.340992;
pub const DEFAULT_CENTER_LNG: f64 = -74.168008;

pub fn default_center() -> LatLng {
    LatLng::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG).expect("default center must be valid")
}

/// Great-circle (haversine) distance between two coordinates, in meters.
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lon1) = (a.lat().to_radians(), a.lng().to_radians());
    let (lat2, lon2) = (b.lat().to_radians(), b.lng().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinate(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng).expect("valid coordinate")
    }

    #[test]
    fn distance_to_self_is_zero() {
        let point = default_center();
        assert_eq!(distance_meters(point, point), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = coordinate(41.3535, -74.17481);
        let b = coordinate(41.323845, -74.152276);
        let forward = distance_meters(a, b);
        let backward = distance_meters(b, a);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn known_pair_distance_is_plausible() {
        // Two member addresses roughly 3.7 km apart in the service area.
        let a = coordinate(41.3535, -74.17481);
        let b = coordinate(41.323845, -74.152276);
        let meters = distance_meters(a, b);
        assert!(meters > 3_500.0 && meters < 4_500.0, "got {meters}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = coordinate(41.0, -74.0);
        let b = coordinate(42.0, -74.0);
        let meters = distance_meters(a, b);
        assert!((meters - 111_195.0).abs() < 500.0, "got {meters}");
    }
}
