//! Conceptual path request for the AI collaborator.

use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{BlockedRouteInfo, CongestionTable, RouteCoordinate, RouteRecord};

/// Structured input handed to the [`PathSuggester`](crate::traits::PathSuggester).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptualPathRequest {
    pub origin_coord: RouteCoordinate,
    pub destination_coord: RouteCoordinate,
    pub blocked_route_info: Vec<BlockedRouteInfo>,
    pub congestion_data: CongestionTable,
}

/// Projects every blocked route to its name and description.
pub fn blocked_route_info(records: &[RouteRecord]) -> Vec<BlockedRouteInfo> {
    records
        .iter()
        .filter(|record| record.is_blocked())
        .map(BlockedRouteInfo::from)
        .collect()
}

pub fn build_request(
    origin: Option<RouteCoordinate>,
    destination: Option<RouteCoordinate>,
    blocked: Vec<BlockedRouteInfo>,
    congestion: &CongestionTable,
) -> Result<ConceptualPathRequest> {
    let origin_coord = require_endpoint(origin, "origin")?;
    let destination_coord = require_endpoint(destination, "destination")?;

    Ok(ConceptualPathRequest {
        origin_coord,
        destination_coord,
        blocked_route_info: blocked,
        congestion_data: congestion.clone(),
    })
}

fn require_endpoint(coord: Option<RouteCoordinate>, label: &str) -> Result<RouteCoordinate> {
    match coord {
        Some(coord) if coord.is_valid() => Ok(coord),
        Some(coord) => Err(Error::InvalidInput(format!("{} {} is out of range", label, coord))),
        None => Err(Error::InvalidInput(format!("{} is required", label))),
    }
}

impl ConceptualPathRequest {
    /// Renders the instruction text sent alongside the structured request.
    pub fn render_prompt(&self) -> String {
        let mut prompt = String::new();
        let _ = writeln!(
            prompt,
            "You are a route planning assistant for Tacna, Peru. Propose one drivable route \
             as key waypoints that a directions service can trace while avoiding blocked areas."
        );
        let _ = writeln!(prompt);
        let _ = writeln!(
            prompt,
            "Origin: latitude {}, longitude {}",
            self.origin_coord.lat, self.origin_coord.lng
        );
        let _ = writeln!(
            prompt,
            "Destination: latitude {}, longitude {}",
            self.destination_coord.lat, self.destination_coord.lng
        );
        let _ = writeln!(prompt);

        let _ = writeln!(prompt, "Blocked routes (avoid every street they cover):");
        if self.blocked_route_info.is_empty() {
            let _ = writeln!(prompt, "- none reported");
        }
        for blocked in &self.blocked_route_info {
            let _ = writeln!(prompt, "- \"{}\" (covers: {})", blocked.name, blocked.description);
        }

        let congestion = if self.congestion_data.is_empty() {
            "no data".to_string()
        } else {
            self.congestion_data
                .iter()
                .map(|(name, level)| format!("{}: {}", name, level))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(prompt, "Congestion (0-100, higher is worse): {}", congestion);
        let _ = writeln!(prompt);

        let _ = writeln!(
            prompt,
            "Insert extra waypoints wherever a straight segment would cross a blocked area, \
             then prefer less congested routes. Mention street names where possible."
        );
        let _ = writeln!(
            prompt,
            "Answer with JSON only: {{\"suggestedPath\": {{\"description\": string, \
             \"coordinates\": [{{\"lat\": number, \"lng\": number}}, ...], \"reasoning\": string}}}}. \
             `coordinates` must hold at least two points, the origin first and the destination last. \
             `reasoning` must explain how the blocked areas are avoided."
        );
        prompt
    }
}
