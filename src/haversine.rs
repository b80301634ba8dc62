//! Great-circle length and drive-time estimates for displayed paths.
//!
//! Straight segments between consecutive points, so a conceptual path
//! (few waypoints) reads shorter than its routed counterpart.

use serde::Serialize;

use crate::model::RouteCoordinate;

/// Average driving speed assumption for time estimation.
pub const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSummary {
    pub distance_km: f64,
    pub estimated_minutes: u32,
}

#[derive(Debug, Clone)]
pub struct HaversineEstimator {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineEstimator {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Haversine distance between two points in kilometers.
    pub fn haversine_km(from: RouteCoordinate, to: RouteCoordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    pub fn path_length_km(points: &[RouteCoordinate]) -> f64 {
        points
            .windows(2)
            .map(|pair| Self::haversine_km(pair[0], pair[1]))
            .sum()
    }

    fn km_to_minutes(&self, km: f64) -> u32 {
        if self.speed_kmh <= 0.0 {
            return 0;
        }
        (km / self.speed_kmh * 60.0).round() as u32
    }

    pub fn summarize(&self, points: &[RouteCoordinate]) -> PathSummary {
        let distance_km = Self::path_length_km(points);
        PathSummary {
            distance_km,
            estimated_minutes: self.km_to_minutes(distance_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> RouteCoordinate {
        RouteCoordinate::new(lat, lng)
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = HaversineEstimator::haversine_km(coord(-18.0146, -70.2536), coord(-18.0146, -70.2536));
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Tacna (-18.01, -70.25) to Arica (-18.48, -70.31), roughly 52 km.
        let dist = HaversineEstimator::haversine_km(coord(-18.01, -70.25), coord(-18.48, -70.31));
        assert!(dist > 48.0 && dist < 56.0, "Tacna to Arica should be ~52km, got {}", dist);
    }

    #[test]
    fn test_path_length_sums_segments() {
        let a = coord(-18.0146, -70.2536);
        let b = coord(-18.0080, -70.2400);
        let c = coord(-18.0000, -70.2300);
        let total = HaversineEstimator::path_length_km(&[a, b, c]);
        let expected = HaversineEstimator::haversine_km(a, b) + HaversineEstimator::haversine_km(b, c);
        assert!((total - expected).abs() < 1e-9);
        assert_eq!(HaversineEstimator::path_length_km(&[a]), 0.0);
    }

    #[test]
    fn test_reasonable_travel_time() {
        let estimator = HaversineEstimator::new(40.0);
        // 10 km at 40 km/h = 15 minutes
        assert_eq!(estimator.km_to_minutes(10.0), 15);
        assert_eq!(HaversineEstimator::new(0.0).km_to_minutes(10.0), 0);
    }
}
