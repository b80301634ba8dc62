//! Tacna locations for realistic test fixtures.

#![allow(dead_code)]

use tacna_navigator::model::RouteCoordinate;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coord(&self) -> RouteCoordinate {
        RouteCoordinate::new(self.lat, self.lng)
    }
}

pub const PLAZA_DE_ARMAS: Location = Location::new("Plaza de Armas", -18.0146, -70.2536);
pub const CIUDAD_UNIVERSITARIA: Location = Location::new("Ciudad Universitaria", -18.0080, -70.2400);
pub const TERMINAL_COLLASUYO: Location = Location::new("Terminal Collasuyo", -17.9968, -70.2377);
pub const HOSPITAL_REGIONAL: Location = Location::new("Hospital Hipólito Unanue", -18.0189, -70.2463);
pub const MERCADO_CENTRAL: Location = Location::new("Mercado Central", -18.0094, -70.2517);
pub const ALTO_DE_LA_ALIANZA: Location = Location::new("Alto de la Alianza", -17.9945, -70.2478);

/// `count` points interpolated between two locations, endpoints included.
pub fn interpolate(from: &Location, to: &Location, count: usize) -> Vec<RouteCoordinate> {
    let steps = count.saturating_sub(1).max(1) as f64;
    (0..count)
        .map(|i| {
            let t = i as f64 / steps;
            RouteCoordinate::new(
                from.lat + (to.lat - from.lat) * t,
                from.lng + (to.lng - from.lng) * t,
            )
        })
        .collect()
}
