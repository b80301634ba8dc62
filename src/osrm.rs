//! OSRM HTTP adapter for detailed driving paths.

use serde::Deserialize;
use tracing::warn;

use crate::directions::{DirectionsRequest, DirectionsResponse, DirectionsStatus};
use crate::polyline::Polyline;
use crate::traits::DirectionsProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn route_url(&self, request: &DirectionsRequest) -> String {
        let coords = request
            .stops()
            .map(|stop| format!("{:.6},{:.6}", stop.lng, stop.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=polyline&alternatives=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }
}

impl DirectionsProvider for OsrmClient {
    fn route(&self, request: &DirectionsRequest) -> DirectionsResponse {
        let url = self.route_url(request);

        // OSRM answers routing failures with 400 and a JSON body carrying the code.
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.json::<OsrmRouteResponse>());

        match response {
            Ok(body) => body.into_directions(),
            Err(err) => {
                warn!(error = %err, "OSRM route request failed");
                DirectionsResponse::failed(DirectionsStatus::UnknownError)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
}

impl OsrmRouteResponse {
    pub(crate) fn into_directions(self) -> DirectionsResponse {
        let status = status_for_code(&self.code);
        if status != DirectionsStatus::Ok {
            return DirectionsResponse::failed(status);
        }

        let mut routes = Vec::with_capacity(self.routes.len());
        for route in self.routes {
            match Polyline::decode(&route.geometry) {
                Ok(polyline) => routes.push(polyline),
                Err(err) => {
                    warn!(error = %err, "undecodable OSRM geometry");
                    return DirectionsResponse::failed(DirectionsStatus::UnknownError);
                }
            }
        }
        DirectionsResponse::ok(routes)
    }
}

fn status_for_code(code: &str) -> DirectionsStatus {
    match code {
        "Ok" => DirectionsStatus::Ok,
        "NoRoute" => DirectionsStatus::ZeroResults,
        "NoSegment" => DirectionsStatus::NotFound,
        "TooBig" => DirectionsStatus::MaxWaypointsExceeded,
        "InvalidUrl" | "InvalidService" | "InvalidVersion" | "InvalidOptions" | "InvalidQuery"
        | "InvalidValue" => DirectionsStatus::InvalidRequest,
        _ => DirectionsStatus::UnknownError,
    }
}
