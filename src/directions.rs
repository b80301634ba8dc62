//! Detailed path requests against the mapping-directions collaborator.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{ConceptualPath, RouteCoordinate};
use crate::polyline::{DetailedPath, Polyline};
use crate::traits::DirectionsProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionsRequest {
    pub origin: RouteCoordinate,
    pub destination: RouteCoordinate,
    /// Ordered stopovers between origin and destination.
    pub waypoints: Vec<RouteCoordinate>,
    pub mode: TravelMode,
}

impl DirectionsRequest {
    /// First point as origin, last as destination, the rest as waypoints.
    pub fn from_conceptual(path: &ConceptualPath) -> Result<Self> {
        let (Some(origin), Some(destination)) = (path.coordinates.first(), path.coordinates.last())
        else {
            return Err(Error::InvalidInput("conceptual path has no coordinates".to_string()));
        };
        let waypoints = if path.coordinates.len() > 2 {
            path.coordinates[1..path.coordinates.len() - 1].to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            origin: *origin,
            destination: *destination,
            waypoints,
            mode: TravelMode::Driving,
        })
    }

    /// Origin, waypoints and destination in travel order.
    pub fn stops(&self) -> impl Iterator<Item = &RouteCoordinate> {
        std::iter::once(&self.origin)
            .chain(self.waypoints.iter())
            .chain(std::iter::once(&self.destination))
    }
}

/// Outcome reported by the directions collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionsStatus {
    Ok,
    NotFound,
    ZeroResults,
    MaxWaypointsExceeded,
    InvalidRequest,
    OverQueryLimit,
    RequestDenied,
    UnknownError,
}

impl fmt::Display for DirectionsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DirectionsStatus::Ok => "OK",
            DirectionsStatus::NotFound => "NOT_FOUND",
            DirectionsStatus::ZeroResults => "ZERO_RESULTS",
            DirectionsStatus::MaxWaypointsExceeded => "MAX_WAYPOINTS_EXCEEDED",
            DirectionsStatus::InvalidRequest => "INVALID_REQUEST",
            DirectionsStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            DirectionsStatus::RequestDenied => "REQUEST_DENIED",
            DirectionsStatus::UnknownError => "UNKNOWN_ERROR",
        };
        f.write_str(label)
    }
}

/// Candidate routes in the collaborator's preference order.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsResponse {
    pub status: DirectionsStatus,
    pub routes: Vec<Polyline>,
}

impl DirectionsResponse {
    pub fn ok(routes: Vec<Polyline>) -> Self {
        Self {
            status: DirectionsStatus::Ok,
            routes,
        }
    }

    pub fn failed(status: DirectionsStatus) -> Self {
        Self {
            status,
            routes: Vec::new(),
        }
    }
}

/// Asks the directions collaborator to trace `path`.
///
/// Only the first candidate route is used. Any failure, including an OK
/// status with no usable geometry, is `DirectionsUnavailable`; there is no
/// retry.
pub fn request_detailed_path<D>(directions: &D, path: &ConceptualPath) -> Result<DetailedPath>
where
    D: DirectionsProvider + ?Sized,
{
    let request = DirectionsRequest::from_conceptual(path)?;
    debug!(waypoints = request.waypoints.len(), "requesting detailed path");

    let response = directions.route(&request);
    if response.status != DirectionsStatus::Ok {
        warn!(status = %response.status, "directions request failed");
        return Err(Error::DirectionsUnavailable(response.status));
    }

    match response.routes.into_iter().next() {
        Some(route) if !route.is_empty() => {
            debug!(points = route.len(), "detailed path received");
            Ok(route)
        }
        _ => {
            warn!("directions returned no usable route");
            Err(Error::DirectionsUnavailable(DirectionsStatus::ZeroResults))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Recording {
        response: DirectionsResponse,
        seen: RefCell<Vec<DirectionsRequest>>,
    }

    impl DirectionsProvider for Recording {
        fn route(&self, request: &DirectionsRequest) -> DirectionsResponse {
            self.seen.borrow_mut().push(request.clone());
            self.response.clone()
        }
    }

    fn path(points: &[(f64, f64)]) -> ConceptualPath {
        ConceptualPath {
            description: String::new(),
            coordinates: points.iter().map(|(lat, lng)| RouteCoordinate::new(*lat, *lng)).collect(),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_request_splits_endpoints_and_waypoints() {
        let request =
            DirectionsRequest::from_conceptual(&path(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]))
                .unwrap();
        assert_eq!(request.origin, RouteCoordinate::new(1.0, 1.0));
        assert_eq!(request.destination, RouteCoordinate::new(4.0, 4.0));
        assert_eq!(
            request.waypoints,
            vec![RouteCoordinate::new(2.0, 2.0), RouteCoordinate::new(3.0, 3.0)]
        );
        assert_eq!(request.mode, TravelMode::Driving);
        assert_eq!(request.stops().count(), 4);
    }

    #[test]
    fn test_two_point_path_has_no_waypoints() {
        let request = DirectionsRequest::from_conceptual(&path(&[(1.0, 1.0), (2.0, 2.0)])).unwrap();
        assert!(request.waypoints.is_empty());
        assert!(DirectionsRequest::from_conceptual(&path(&[])).is_err());
    }

    #[test]
    fn test_uses_first_route_only() {
        let first = Polyline::new(vec![RouteCoordinate::new(1.0, 1.0)]);
        let second = Polyline::new(vec![RouteCoordinate::new(9.0, 9.0)]);
        let provider = Recording {
            response: DirectionsResponse::ok(vec![first.clone(), second]),
            seen: RefCell::new(Vec::new()),
        };
        let detailed = request_detailed_path(&provider, &path(&[(1.0, 1.0), (2.0, 2.0)])).unwrap();
        assert_eq!(detailed, first);
        assert_eq!(provider.seen.borrow().len(), 1);
    }

    #[test]
    fn test_empty_results_are_unavailable() {
        for response in [
            DirectionsResponse::ok(vec![]),
            DirectionsResponse::ok(vec![Polyline::new(vec![])]),
            DirectionsResponse::failed(DirectionsStatus::OverQueryLimit),
        ] {
            let provider = Recording {
                response,
                seen: RefCell::new(Vec::new()),
            };
            let result = request_detailed_path(&provider, &path(&[(1.0, 1.0), (2.0, 2.0)]));
            assert!(matches!(result, Err(Error::DirectionsUnavailable(_))));
            assert_eq!(provider.seen.borrow().len(), 1, "no retry expected");
        }
    }
}
