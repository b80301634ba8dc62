//! Route data model shared by the store, the AI request/response contract and
//! the directions requester.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest congestion level accepted in a [`CongestionTable`].
pub const MAX_CONGESTION: u8 = 100;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl RouteCoordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    pub fn checked(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self { lat, lng };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(Error::Validation(format!(
                "coordinate ({}, {}) is outside lat [-90, 90] / lng [-180, 180]",
                lat, lng
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl std::fmt::Display for RouteCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

impl std::str::FromStr for RouteCoordinate {
    type Err = Error;

    /// Parses `"lat,lng"`, surrounding whitespace allowed.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',').map(str::trim);
        let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::Validation(format!("expected \"lat,lng\", got {:?}", s)));
        };
        let lat = lat
            .parse::<f64>()
            .map_err(|_| Error::Validation(format!("latitude {:?} is not a number", lat)))?;
        let lng = lng
            .parse::<f64>()
            .map_err(|_| Error::Validation(format!("longitude {:?} is not a number", lng)))?;
        Self::checked(lat, lng)
    }
}

/// Operational state of an admin route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Open,
    Blocked,
}

impl RouteStatus {
    pub fn toggled(self) -> Self {
        match self {
            RouteStatus::Open => RouteStatus::Blocked,
            RouteStatus::Blocked => RouteStatus::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Open => "open",
            RouteStatus::Blocked => "blocked",
        }
    }
}

/// An operator-managed named route.
///
/// `coordinates` is either empty or holds at least two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub id: String,
    pub name: String,
    pub path_description: String,
    pub status: RouteStatus,
    pub coordinates: Vec<RouteCoordinate>,
}

impl RouteRecord {
    pub fn is_blocked(&self) -> bool {
        self.status == RouteStatus::Blocked
    }
}

/// Congestion level (0-100) keyed by route name.
///
/// Names are matched to [`RouteRecord::name`] by convention only; there is no
/// referential check against the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>")]
pub struct CongestionTable(BTreeMap<String, u8>);

impl CongestionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route_name: impl Into<String>, level: i64) -> Result<()> {
        let route_name = route_name.into();
        let level = u8::try_from(level)
            .ok()
            .filter(|level| *level <= MAX_CONGESTION)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "congestion for {:?} must be within 0..={}, got {}",
                    route_name, MAX_CONGESTION, level
                ))
            })?;
        self.0.insert(route_name, level);
        Ok(())
    }

    pub fn get(&self, route_name: &str) -> Option<u8> {
        self.0.get(route_name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(name, level)| (name.as_str(), *level))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<String, i64>> for CongestionTable {
    type Error = Error;

    fn try_from(raw: BTreeMap<String, i64>) -> Result<Self> {
        let mut table = CongestionTable::new();
        for (name, level) in raw {
            table.insert(name, level)?;
        }
        Ok(table)
    }
}

/// Projection of a blocked [`RouteRecord`] forwarded to the AI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedRouteInfo {
    pub name: String,
    pub description: String,
}

impl From<&RouteRecord> for BlockedRouteInfo {
    fn from(record: &RouteRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: record.path_description.clone(),
        }
    }
}

/// AI-proposed waypoint path for one origin/destination request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptualPath {
    pub description: String,
    pub coordinates: Vec<RouteCoordinate>,
    pub reasoning: String,
}
