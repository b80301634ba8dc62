//! Route suggestion session.
//!
//! Ties the route store, the AI collaborator and the directions collaborator
//! together for one user session. Any change to the endpoints or to route
//! state clears the displayed path and bumps a generation counter, and so
//! does issuing a new path job. Results of jobs issued under an older
//! generation are discarded.

use tracing::{debug, info, warn};

use crate::defaults::is_within_service_area;
use crate::directions::request_detailed_path;
use crate::error::{Error, Result, StorageError};
use crate::haversine::{HaversineEstimator, PathSummary};
use crate::model::{CongestionTable, ConceptualPath, RouteCoordinate, RouteRecord};
use crate::polyline::{DetailedPath, Polyline};
use crate::request::{ConceptualPathRequest, blocked_route_info, build_request};
use crate::response::{PathSource, ValidatedPath, validate_response};
use crate::store::{RouteStore, SyncReport};
use crate::traits::{DirectionsProvider, PathSuggester, RouteStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Short user-facing message describing a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Where the line drawn on the map came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPathSource {
    /// Routed geometry from the directions collaborator.
    Directions,
    /// The conceptual waypoints, drawn directly.
    Conceptual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedPath {
    pub conceptual: ConceptualPath,
    pub conceptual_source: PathSource,
    pub map_path: Polyline,
    pub map_source: MapPathSource,
    pub summary: PathSummary,
}

/// A path generation captured at issue time.
#[derive(Debug, Clone)]
pub struct PathJob {
    generation: u64,
    request: ConceptualPathRequest,
}

/// Result of running a [`PathJob`], not yet applied to the session.
#[derive(Debug)]
pub struct PathOutcome {
    generation: u64,
    validated: ValidatedPath,
    detailed: Result<DetailedPath>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    Applied,
    /// The session changed after the job was issued.
    Discarded,
}

impl PathJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &ConceptualPathRequest {
        &self.request
    }

    /// Calls both collaborators in sequence. Never fails: an unusable AI
    /// response becomes the fallback path and a directions failure is kept
    /// for [`Navigator::apply`] to degrade.
    pub fn run<A, D>(self, suggester: &A, directions: &D) -> PathOutcome
    where
        A: PathSuggester + ?Sized,
        D: DirectionsProvider + ?Sized,
    {
        let raw = suggester.suggest(&self.request);
        let validated = validate_response(
            raw.as_ref(),
            Some(self.request.origin_coord),
            Some(self.request.destination_coord),
        );
        let detailed = request_detailed_path(directions, &validated.path);

        PathOutcome {
            generation: self.generation,
            validated,
            detailed,
        }
    }
}

impl PathOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct Navigator<S: RouteStorage, A, D> {
    store: RouteStore<S>,
    congestion: CongestionTable,
    suggester: A,
    directions: D,
    estimator: HaversineEstimator,
    origin: Option<RouteCoordinate>,
    destination: Option<RouteCoordinate>,
    generation: u64,
    displayed: Option<DisplayedPath>,
    notices: Vec<Notice>,
}

impl<S, A, D> Navigator<S, A, D>
where
    S: RouteStorage,
    A: PathSuggester,
    D: DirectionsProvider,
{
    pub fn new(storage: S, suggester: A, directions: D, congestion: CongestionTable) -> Self {
        Self {
            store: RouteStore::new(storage),
            congestion,
            suggester,
            directions,
            estimator: HaversineEstimator::default(),
            origin: None,
            destination: None,
            generation: 0,
            displayed: None,
            notices: Vec::new(),
        }
    }

    pub fn with_estimator(mut self, estimator: HaversineEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn routes(&self) -> &[RouteRecord] {
        self.store.records()
    }

    pub fn store(&self) -> &RouteStore<S> {
        &self.store
    }

    pub fn congestion(&self) -> &CongestionTable {
        &self.congestion
    }

    pub fn suggester(&self) -> &A {
        &self.suggester
    }

    pub fn directions(&self) -> &D {
        &self.directions
    }

    pub fn origin(&self) -> Option<RouteCoordinate> {
        self.origin
    }

    pub fn destination(&self) -> Option<RouteCoordinate> {
        self.destination
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn displayed(&self) -> Option<&DisplayedPath> {
        self.displayed.as_ref()
    }

    /// Drains pending user-facing notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Loads the route collection, reporting a reset to the user.
    pub fn load_routes(&mut self) {
        let report = self.store.load();
        if let Some(reason) = report.reset.as_ref().filter(|reason| reason.is_data_loss()) {
            debug!(?reason, "notifying data reset");
            self.notices.push(Notice::new(
                NoticeLevel::Warning,
                "Rutas restauradas",
                "No se pudieron cargar las rutas guardadas. Se usaron los valores por defecto.",
            ));
        }
        if let Some(err) = report.persist_error {
            self.notify_storage_failure(&err);
        }
        self.invalidate();
    }

    /// Outside the Tacna service area only earns a warning notice.
    pub fn set_origin(&mut self, origin: Option<RouteCoordinate>) {
        if self.origin != origin {
            self.warn_outside_service_area(origin.as_ref(), "El origen");
            self.origin = origin;
            self.invalidate();
        }
    }

    pub fn set_destination(&mut self, destination: Option<RouteCoordinate>) {
        if self.destination != destination {
            self.warn_outside_service_area(destination.as_ref(), "El destino");
            self.destination = destination;
            self.invalidate();
        }
    }

    /// Flips a route's status in memory. Persisted by [`Navigator::save_routes`].
    pub fn toggle_route(&mut self, id: &str) -> bool {
        let changed = self.store.toggle_status(id);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Adds a route and persists the collection.
    ///
    /// Storage failures only produce a notice; the route stays added.
    pub fn add_route(&mut self, record: RouteRecord) -> Result<()> {
        let name = record.name.clone();
        self.store.add(record)?;
        self.invalidate();
        self.persist_quietly();
        self.notices.push(Notice::new(
            NoticeLevel::Info,
            "Ruta agregada",
            format!("La ruta \"{}\" ha sido agregada.", name),
        ));
        Ok(())
    }

    /// Removes a route and persists the collection. Unknown ids are ignored.
    pub fn remove_route(&mut self, id: &str) -> Option<RouteRecord> {
        let removed = self.store.remove(id)?;
        self.invalidate();
        self.persist_quietly();
        Some(removed)
    }

    pub fn reset_routes(&mut self) {
        let result = self.store.reset_to_defaults();
        self.invalidate();
        if let Err(err) = result {
            self.notify_storage_failure(&err);
        }
    }

    /// Persists the current route collection.
    pub fn save_routes(&mut self) -> Result<()> {
        self.store.persist().map_err(|err| {
            self.notify_storage_failure(&err);
            Error::from(err)
        })?;
        info!(count = self.store.records().len(), "routes saved");
        Ok(())
    }

    /// Applies route changes made by other sessions.
    pub fn sync_external_changes(&mut self) -> SyncReport {
        let report = self.store.sync_external_changes();
        if report.applied > 0 {
            self.invalidate();
        }
        report
    }

    /// Captures the current endpoints and route state into a job.
    ///
    /// Fails with `InvalidInput` before any collaborator is contacted.
    pub fn prepare_path(&mut self) -> Result<PathJob> {
        let request = build_request(
            self.origin,
            self.destination,
            blocked_route_info(self.store.records()),
            &self.congestion,
        )
        .inspect_err(|err| {
            self.notices.push(Notice::new(
                NoticeLevel::Error,
                "Origen o destino inválido",
                err.to_string(),
            ));
        })?;

        self.generation += 1;
        self.displayed = None;
        Ok(PathJob {
            generation: self.generation,
            request,
        })
    }

    /// Shows `outcome` if the session has not changed since its job was
    /// issued.
    pub fn apply(&mut self, outcome: PathOutcome) -> ApplyResult {
        if outcome.generation != self.generation {
            debug!(
                job = outcome.generation,
                current = self.generation,
                "discarding stale path result"
            );
            return ApplyResult::Discarded;
        }

        let PathOutcome {
            validated, detailed, ..
        } = outcome;

        if validated.is_fallback() {
            self.notices.push(Notice::new(
                NoticeLevel::Warning,
                "Ruta sugerida no disponible",
                validated.path.description.clone(),
            ));
        }

        let (map_path, map_source) = match detailed {
            Ok(detailed) => (detailed, MapPathSource::Directions),
            Err(err) => {
                warn!(error = %err, "showing conceptual waypoints instead of routed path");
                self.notices.push(Notice::new(
                    NoticeLevel::Warning,
                    "Ruta detallada no disponible",
                    format!(
                        "No se pudo trazar una ruta detallada ({}). Se muestra la ruta conceptual.",
                        err
                    ),
                ));
                (
                    Polyline::new(validated.path.coordinates.clone()),
                    MapPathSource::Conceptual,
                )
            }
        };

        let summary = self.estimator.summarize(map_path.points());
        self.displayed = Some(DisplayedPath {
            conceptual: validated.path,
            conceptual_source: validated.source,
            map_path,
            map_source,
            summary,
        });
        ApplyResult::Applied
    }

    /// Prepares, runs and applies a path job in one step.
    pub fn generate_path(&mut self) -> Result<&DisplayedPath> {
        let job = self.prepare_path()?;
        let outcome = job.run(&self.suggester, &self.directions);
        self.apply(outcome);
        self.displayed
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("path generation was superseded".to_string()))
    }

    fn warn_outside_service_area(&mut self, coord: Option<&RouteCoordinate>, label: &str) {
        let Some(coord) = coord.filter(|coord| !is_within_service_area(coord)) else {
            return;
        };
        warn!(%coord, "endpoint outside the Tacna service area");
        self.notices.push(Notice::new(
            NoticeLevel::Warning,
            "Fuera de Tacna",
            format!("{} ({}) está fuera del área de servicio de Tacna.", label, coord),
        ));
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        if self.displayed.take().is_some() {
            debug!(generation = self.generation, "displayed path cleared");
        }
    }

    fn persist_quietly(&mut self) {
        if let Err(err) = self.store.persist() {
            self.notify_storage_failure(&err);
        }
    }

    fn notify_storage_failure(&mut self, err: &StorageError) {
        warn!(error = %err, "failed to persist routes");
        self.notices.push(Notice::new(
            NoticeLevel::Error,
            "Error al guardar",
            "No se pudieron persistir los cambios en las rutas.",
        ));
    }
}
