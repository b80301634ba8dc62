//! Polyline representation for routed paths.
//!
//! Paths are kept as decoded coordinate sequences. The compact encoded
//! polyline format (precision 5) only appears where the directions service
//! hands geometry to us.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::RouteCoordinate;

const PRECISION: f64 = 1e5;

/// A routed path as an ordered sequence of coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<RouteCoordinate>,
}

/// Turn-by-turn geometry produced by the directions collaborator.
pub type DetailedPath = Polyline;

impl Polyline {
    pub fn new(points: Vec<RouteCoordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[RouteCoordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<RouteCoordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Decodes an encoded polyline string.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = encoded.as_bytes();
        let mut index = 0;
        let mut lat = 0i64;
        let mut lng = 0i64;
        let mut points = Vec::new();

        while index < bytes.len() {
            lat += next_delta(bytes, &mut index)?;
            lng += next_delta(bytes, &mut index)?;
            points.push(RouteCoordinate::checked(
                lat as f64 / PRECISION,
                lng as f64 / PRECISION,
            )?);
        }

        Ok(Self { points })
    }
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(byte) = bytes.get(*index) else {
            return Err(Error::Validation("truncated encoded polyline".to_string()));
        };
        *index += 1;

        let chunk = i64::from(*byte) - 63;
        if !(0..64).contains(&chunk) || shift > 30 {
            return Err(Error::Validation(format!(
                "invalid encoded polyline byte {:?}",
                *byte as char
            )));
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> RouteCoordinate {
        RouteCoordinate::new(lat, lng)
    }

    #[test]
    fn test_new_and_points() {
        let points = vec![coord(-18.0146, -70.2536), coord(-18.008, -70.24)];
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.points(), &points[..]);
        assert_eq!(polyline.len(), 2);
    }

    #[test]
    fn test_empty_polyline() {
        let polyline = Polyline::new(vec![]);
        assert!(polyline.is_empty());
        assert!(Polyline::decode("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_reference_polyline() {
        // Reference vector from the encoded polyline format documentation.
        let polyline = Polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(
            polyline.into_points(),
            vec![coord(38.5, -120.2), coord(40.7, -120.95), coord(43.252, -126.453)]
        );
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        assert!(Polyline::decode("_p~iF").is_err());
        assert!(Polyline::decode("_p~iF~ps|").is_err());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let polyline = Polyline::new(vec![coord(1.0, 2.0)]);
        let json = serde_json::to_string(&polyline).unwrap();
        assert_eq!(json, r#"[{"lat":1.0,"lng":2.0}]"#);
    }
}
