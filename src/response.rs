//! Validation of the AI collaborator's response and the fallback path.
//!
//! An accepted response is passed through untouched. In particular nothing
//! here checks that the suggested waypoints actually avoid blocked routes;
//! that property rests entirely on the collaborator.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::defaults::SENTINEL_COORDINATE;
use crate::model::{ConceptualPath, RouteCoordinate};

pub const FALLBACK_DESCRIPTION: &str = "No se pudo generar automáticamente una ruta que evite \
    los bloqueos. Se muestra una línea directa entre el origen y el destino.";

pub const FALLBACK_REASONING: &str = "La sugerencia automática no devolvió una ruta válida con \
    al menos dos puntos. Revise que las descripciones de las rutas bloqueadas sean claras o \
    intente con otros puntos.";

/// Why a response was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No response at all.
    Absent,
    /// The response does not match the expected shape.
    Malformed(String),
    MissingPath,
    MissingCoordinates,
    TooFewCoordinates(usize),
    CoordinateOutOfRange,
}

/// Where a validated path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSource {
    Suggested,
    Fallback(RejectReason),
}

/// A conceptual path with at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPath {
    pub path: ConceptualPath,
    pub source: PathSource,
}

impl ValidatedPath {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PathSource::Fallback(_))
    }
}

#[derive(Debug, Deserialize)]
struct SuggestionEnvelope {
    #[serde(rename = "suggestedPath")]
    suggested_path: Option<SuggestedPathWire>,
}

#[derive(Debug, Deserialize)]
struct SuggestedPathWire {
    #[serde(default)]
    description: String,
    coordinates: Option<Vec<RouteCoordinate>>,
    #[serde(default)]
    reasoning: String,
}

/// Validates a raw AI response, substituting the fallback path when it is
/// unusable. Never fails.
pub fn validate_response(
    raw: Option<&Value>,
    origin: Option<RouteCoordinate>,
    destination: Option<RouteCoordinate>,
) -> ValidatedPath {
    match accept(raw) {
        Ok(path) => ValidatedPath {
            path,
            source: PathSource::Suggested,
        },
        Err(reason) => {
            warn!(
                ?reason,
                origin = ?origin,
                destination = ?destination,
                "AI response rejected, using direct-line fallback"
            );
            ValidatedPath {
                path: fallback_path(origin, destination),
                source: PathSource::Fallback(reason),
            }
        }
    }
}

fn accept(raw: Option<&Value>) -> Result<ConceptualPath, RejectReason> {
    let raw = raw.filter(|value| !value.is_null()).ok_or(RejectReason::Absent)?;
    let envelope = SuggestionEnvelope::deserialize(raw)
        .map_err(|err| RejectReason::Malformed(err.to_string()))?;
    let suggested = envelope.suggested_path.ok_or(RejectReason::MissingPath)?;
    let coordinates = suggested.coordinates.ok_or(RejectReason::MissingCoordinates)?;

    if coordinates.len() < 2 {
        return Err(RejectReason::TooFewCoordinates(coordinates.len()));
    }
    if coordinates.iter().any(|coord| !coord.is_valid()) {
        return Err(RejectReason::CoordinateOutOfRange);
    }

    Ok(ConceptualPath {
        description: suggested.description,
        coordinates,
        reasoning: suggested.reasoning,
    })
}

/// Direct-line path between whichever endpoints are known.
///
/// A single known endpoint is duplicated; with none the sentinel coordinate
/// is used for both points.
pub fn fallback_path(
    origin: Option<RouteCoordinate>,
    destination: Option<RouteCoordinate>,
) -> ConceptualPath {
    let origin = origin.filter(RouteCoordinate::is_valid);
    let destination = destination.filter(RouteCoordinate::is_valid);
    let (start, end) = match (origin, destination) {
        (Some(origin), Some(destination)) => (origin, destination),
        (Some(only), None) | (None, Some(only)) => (only, only),
        (None, None) => (SENTINEL_COORDINATE, SENTINEL_COORDINATE),
    };

    ConceptualPath {
        description: FALLBACK_DESCRIPTION.to_string(),
        coordinates: vec![start, end],
        reasoning: FALLBACK_REASONING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ORIGIN: RouteCoordinate = RouteCoordinate::new(-18.0146, -70.2536);
    const DESTINATION: RouteCoordinate = RouteCoordinate::new(-18.0080, -70.2400);

    fn fallback_reason(raw: Option<&Value>) -> RejectReason {
        match validate_response(raw, Some(ORIGIN), Some(DESTINATION)).source {
            PathSource::Fallback(reason) => reason,
            PathSource::Suggested => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_reject_reasons() {
        assert_eq!(fallback_reason(None), RejectReason::Absent);
        assert_eq!(fallback_reason(Some(&Value::Null)), RejectReason::Absent);
        assert_eq!(fallback_reason(Some(&json!({}))), RejectReason::MissingPath);
        assert_eq!(
            fallback_reason(Some(&json!({"suggestedPath": {"description": "x"}}))),
            RejectReason::MissingCoordinates
        );
        assert_eq!(
            fallback_reason(Some(&json!({"suggestedPath": {"coordinates": []}}))),
            RejectReason::TooFewCoordinates(0)
        );
        assert!(matches!(
            fallback_reason(Some(&json!("just text"))),
            RejectReason::Malformed(_)
        ));
        assert!(matches!(
            fallback_reason(Some(&json!({"suggestedPath": {"coordinates": [{"lat": "a"}, {"lat": 1}]}}))),
            RejectReason::Malformed(_)
        ));
        assert_eq!(
            fallback_reason(Some(&json!({"suggestedPath": {"coordinates": [
                {"lat": -18.0, "lng": -70.0}, {"lat": -120.0, "lng": -70.0}
            ]}}))),
            RejectReason::CoordinateOutOfRange
        );
    }

    #[test]
    fn test_missing_strings_default_to_empty() {
        let raw = json!({"suggestedPath": {"coordinates": [
            {"lat": -18.0146, "lng": -70.2536}, {"lat": -18.008, "lng": -70.24}
        ]}});
        let validated = validate_response(Some(&raw), Some(ORIGIN), Some(DESTINATION));
        assert_eq!(validated.source, PathSource::Suggested);
        assert_eq!(validated.path.description, "");
        assert_eq!(validated.path.reasoning, "");
    }

    #[test]
    fn test_fallback_endpoint_combinations() {
        assert_eq!(
            fallback_path(Some(ORIGIN), Some(DESTINATION)).coordinates,
            vec![ORIGIN, DESTINATION]
        );
        assert_eq!(fallback_path(Some(ORIGIN), None).coordinates, vec![ORIGIN, ORIGIN]);
        assert_eq!(
            fallback_path(None, Some(DESTINATION)).coordinates,
            vec![DESTINATION, DESTINATION]
        );
        assert_eq!(
            fallback_path(None, None).coordinates,
            vec![SENTINEL_COORDINATE, SENTINEL_COORDINATE]
        );
        assert_eq!(
            fallback_path(Some(RouteCoordinate::new(f64::NAN, 0.0)), Some(DESTINATION)).coordinates,
            vec![DESTINATION, DESTINATION]
        );
    }

    #[test]
    fn test_fallback_carries_explanation() {
        let path = fallback_path(None, None);
        assert_eq!(path.description, FALLBACK_DESCRIPTION);
        assert_eq!(path.reasoning, FALLBACK_REASONING);
    }
}
