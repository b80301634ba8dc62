//! Admin form input for new routes.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{RouteCoordinate, RouteRecord, RouteStatus};
use crate::store::is_valid_route_id;

const MIN_NAME_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 5;

/// Raw values typed by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteForm {
    pub id: String,
    pub name: String,
    pub path_description: String,
    /// `"lat,lng; lat,lng; ..."`
    pub coordinates: String,
}

impl RouteForm {
    /// Validates the form into a new open route.
    ///
    /// Errors name the offending field. Id uniqueness is checked by the store.
    pub fn validate(&self) -> Result<RouteRecord> {
        let id = self.id.trim();
        if !is_valid_route_id(id) {
            return Err(field_error(
                "id",
                "must be non-empty and use only letters, digits, '-' and '_'",
            ));
        }
        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(field_error(
                "name",
                &format!("needs at least {} characters", MIN_NAME_CHARS),
            ));
        }
        let description = self.path_description.trim();
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(field_error(
                "pathDescription",
                &format!("needs at least {} characters", MIN_DESCRIPTION_CHARS),
            ));
        }
        let coordinates = parse_coordinate_list(&self.coordinates)
            .map_err(|err| field_error("coordinates", &err.to_string()))?;

        Ok(RouteRecord {
            id: id.to_string(),
            name: name.to_string(),
            path_description: description.to_string(),
            status: RouteStatus::Open,
            coordinates,
        })
    }
}

fn field_error(field: &str, message: &str) -> Error {
    Error::Validation(format!("{}: {}", field, message))
}

/// Parses `"lat,lng; lat,lng; ..."` into at least two coordinates.
/// Empty segments are skipped.
pub fn parse_coordinate_list(input: &str) -> Result<Vec<RouteCoordinate>> {
    let coordinates = input
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(str::parse::<RouteCoordinate>)
        .collect::<Result<Vec<_>>>()?;

    if coordinates.len() < 2 {
        return Err(Error::Validation(format!(
            "expected at least 2 points, got {}",
            coordinates.len()
        )));
    }
    Ok(coordinates)
}
