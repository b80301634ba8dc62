//! Seed data used when nothing valid is persisted.

use crate::model::{CongestionTable, RouteCoordinate, RouteRecord, RouteStatus};

/// Storage key holding the serialized route collection.
pub const ROUTES_STORAGE_KEY: &str = "tacnaTransitRoutes";

/// Plaza de Armas, Tacna. Used when a fallback path has no endpoint at all.
pub const SENTINEL_COORDINATE: RouteCoordinate = RouteCoordinate::new(-18.0146, -70.2536);

/// Latitude and longitude ranges of the Tacna service area.
pub const SERVICE_AREA_LAT: (f64, f64) = (-18.2, -17.8);
pub const SERVICE_AREA_LNG: (f64, f64) = (-70.4, -70.0);

/// Whether `coord` falls inside the Tacna service area.
pub fn is_within_service_area(coord: &RouteCoordinate) -> bool {
    (SERVICE_AREA_LAT.0..=SERVICE_AREA_LAT.1).contains(&coord.lat)
        && (SERVICE_AREA_LNG.0..=SERVICE_AREA_LNG.1).contains(&coord.lng)
}

struct SeedRoute {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    congestion: i64,
    points: &'static [(f64, f64)],
}

const SEED_ROUTES: &[SeedRoute] = &[
    SeedRoute {
        id: "R001",
        name: "Ruta 101 - Circunvalación",
        description: "Av. Principal -> Calle Robles -> Av. Sol",
        congestion: 30,
        points: &[
            (-18.0066, -70.2462),
            (-18.0119, -70.2395),
            (-18.0203, -70.2431),
            (-18.0228, -70.2549),
        ],
    },
    SeedRoute {
        id: "R002",
        name: "Ruta 20AB - Centro Histórico",
        description: "Plaza Mayor -> Calle Comercio -> Mercado Central",
        congestion: 65,
        points: &[
            (-18.0146, -70.2536),
            (-18.0131, -70.2502),
            (-18.0108, -70.2481),
            (-18.0094, -70.2517),
        ],
    },
    SeedRoute {
        id: "R003",
        name: "Ruta Expreso Norte",
        description: "Terminal Norte -> Vía Rápida -> Zona Industrial",
        congestion: 15,
        points: &[
            (-17.9987, -70.2405),
            (-17.9921, -70.2363),
            (-17.9842, -70.2298),
            (-17.9776, -70.2254),
        ],
    },
    SeedRoute {
        id: "R004",
        name: "Ruta Sur Alimentadora",
        description: "Barrio Flores -> Av. Progreso -> Hospital Regional",
        congestion: 40,
        points: &[
            (-18.0301, -70.2612),
            (-18.0267, -70.2558),
            (-18.0235, -70.2497),
            (-18.0189, -70.2463),
        ],
    },
];

/// The fixed default route collection. Every route starts open.
pub fn default_routes() -> Vec<RouteRecord> {
    SEED_ROUTES
        .iter()
        .map(|seed| RouteRecord {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            path_description: seed.description.to_string(),
            status: RouteStatus::Open,
            coordinates: seed
                .points
                .iter()
                .map(|(lat, lng)| RouteCoordinate::new(*lat, *lng))
                .collect(),
        })
        .collect()
}

/// Congestion levels for the default routes, keyed by route name.
pub fn default_congestion() -> CongestionTable {
    let mut table = CongestionTable::new();
    for seed in SEED_ROUTES {
        // Seed levels are within range.
        let _ = table.insert(seed.name, seed.congestion);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::validate_route_records;

    #[test]
    fn test_default_routes_pass_validation() {
        let routes = default_routes();
        assert_eq!(routes.len(), 4);
        let json = serde_json::to_value(&routes).unwrap();
        assert_eq!(validate_route_records(&json).unwrap(), routes);
    }

    #[test]
    fn test_congestion_matches_route_names() {
        let table = default_congestion();
        for route in default_routes() {
            assert!(table.get(&route.name).is_some(), "missing {}", route.name);
        }
        assert_eq!(table.get("Ruta 20AB - Centro Histórico"), Some(65));
    }

    #[test]
    fn test_service_area() {
        assert!(is_within_service_area(&SENTINEL_COORDINATE));
        for route in default_routes() {
            assert!(route.coordinates.iter().all(is_within_service_area), "{}", route.id);
        }
        // Lima, Arica.
        assert!(!is_within_service_area(&RouteCoordinate::new(-12.0464, -77.0428)));
        assert!(!is_within_service_area(&RouteCoordinate::new(-18.4783, -70.3126)));
        assert!(!is_within_service_area(&RouteCoordinate::new(f64::NAN, -70.25)));
    }
}
