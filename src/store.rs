//! The route record store.
//!
//! Owns the in-memory route collection, loads it through a [`RouteStorage`]
//! port with self-healing validation, and applies changes made by other
//! sessions. Initial loads and change notifications go through the same
//! [`parse_route_payload`] check.

use std::collections::HashSet;
use std::sync::mpsc::Receiver;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::defaults::{ROUTES_STORAGE_KEY, default_routes};
use crate::error::{Error, Result, StorageError};
use crate::model::{RouteCoordinate, RouteRecord};
use crate::traits::{RouteStorage, StorageEvent};

/// Why [`RouteStore::load`] substituted the default dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetReason {
    /// Nothing was stored under the key.
    Missing,
    /// The storage backend could not be read.
    Unreadable(String),
    /// The payload was not valid JSON.
    Corrupt(String),
    /// The payload parsed but is not a valid route collection.
    Invalid(String),
}

impl ResetReason {
    /// Whether the operator should be told their saved routes were replaced.
    pub fn is_data_loss(&self) -> bool {
        !matches!(self, ResetReason::Missing)
    }
}

/// Outcome of [`RouteStore::load`].
#[derive(Debug)]
pub struct LoadReport {
    pub records: Vec<RouteRecord>,
    /// Set when the default dataset was substituted.
    pub reset: Option<ResetReason>,
    /// Set when re-persisting the defaults failed.
    pub persist_error: Option<StorageError>,
}

/// Outcome of [`RouteStore::sync_external_changes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Notifications whose payload replaced local state.
    pub applied: usize,
    /// Notifications dropped because the payload was absent or invalid.
    pub ignored: usize,
}

pub struct RouteStore<S: RouteStorage> {
    storage: S,
    key: String,
    records: Vec<RouteRecord>,
    changes: Receiver<StorageEvent>,
    revision: u64,
}

impl<S: RouteStorage> RouteStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, ROUTES_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let changes = storage.subscribe(&key);
        Self {
            storage,
            key,
            records: Vec::new(),
            changes,
            revision: 0,
        }
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&RouteRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Incremented on every change to the in-memory collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Loads the collection, substituting and persisting the defaults when
    /// the stored payload is missing, unreadable or invalid.
    pub fn load(&mut self) -> LoadReport {
        let reset = match self.storage.read(&self.key) {
            Ok(Some(raw)) => match parse_route_payload(&raw) {
                Ok(records) => {
                    debug!(count = records.len(), key = %self.key, "loaded stored routes");
                    self.replace(records);
                    None
                }
                Err(reason) => Some(reason),
            },
            Ok(None) => Some(ResetReason::Missing),
            Err(err) => Some(ResetReason::Unreadable(err.to_string())),
        };

        let mut persist_error = None;
        if let Some(reason) = &reset {
            if reason.is_data_loss() {
                warn!(?reason, key = %self.key, "stored routes unusable, restoring defaults");
            } else {
                info!(key = %self.key, "no stored routes, seeding defaults");
            }
            self.replace(default_routes());
            if let Err(err) = self.persist() {
                warn!(error = %err, key = %self.key, "failed to persist default routes");
                persist_error = Some(err);
            }
        }

        LoadReport {
            records: self.records.clone(),
            reset,
            persist_error,
        }
    }

    /// Persists `records` verbatim under the store's key.
    pub fn save(&self, records: &[RouteRecord]) -> std::result::Result<(), StorageError> {
        let payload = serde_json::to_string(records)?;
        self.storage.write(&self.key, &payload)
    }

    /// Persists the current in-memory collection.
    pub fn persist(&self) -> std::result::Result<(), StorageError> {
        self.save(&self.records)
    }

    /// Flips open/blocked for `id`. Returns `false` if no such route exists.
    pub fn toggle_status(&mut self, id: &str) -> bool {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            debug!(id, "toggle ignored, unknown route");
            return false;
        };
        record.status = record.status.toggled();
        debug!(id, status = record.status.as_str(), "route status toggled");
        self.revision += 1;
        true
    }

    pub fn add(&mut self, record: RouteRecord) -> Result<()> {
        validate_record(&record)?;
        if self.get(&record.id).is_some() {
            return Err(Error::DuplicateId(record.id));
        }
        self.records.push(record);
        self.revision += 1;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<RouteRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        self.revision += 1;
        Some(self.records.remove(index))
    }

    /// Restores and persists the default dataset.
    pub fn reset_to_defaults(&mut self) -> std::result::Result<(), StorageError> {
        self.replace(default_routes());
        self.persist()
    }

    /// Applies pending notifications from other sessions.
    ///
    /// A valid payload replaces local state wholesale; anything else is
    /// logged and ignored.
    pub fn sync_external_changes(&mut self) -> SyncReport {
        let mut report = SyncReport::default();
        while let Ok(event) = self.changes.try_recv() {
            if event.key != self.key {
                continue;
            }
            let Some(raw) = event.new_value else {
                debug!(key = %self.key, "external removal ignored");
                report.ignored += 1;
                continue;
            };
            match parse_route_payload(&raw) {
                Ok(records) => {
                    info!(count = records.len(), "routes replaced by external change");
                    self.replace(records);
                    report.applied += 1;
                }
                Err(reason) => {
                    warn!(?reason, "invalid external route change ignored");
                    report.ignored += 1;
                }
            }
        }
        report
    }

    fn replace(&mut self, records: Vec<RouteRecord>) {
        self.records = records;
        self.revision += 1;
    }
}

/// Parses a stored payload into a validated route collection.
pub fn parse_route_payload(raw: &str) -> std::result::Result<Vec<RouteRecord>, ResetReason> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| ResetReason::Corrupt(err.to_string()))?;
    validate_route_records(&value).map_err(|err| ResetReason::Invalid(err.to_string()))
}

/// The route collection predicate.
///
/// Accepts an array whose elements each carry a non-empty string `id` and
/// `name`, a string `pathDescription`, a status of `"open"` or `"blocked"`,
/// and a `coordinates` array of numeric in-range `lat`/`lng` objects with
/// zero or at least two entries. Ids must be unique.
pub fn validate_route_records(value: &Value) -> Result<Vec<RouteRecord>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::Validation("route payload is not an array".to_string()))?;

    for (index, item) in items.iter().enumerate() {
        check_record_shape(item).map_err(|msg| Error::Validation(format!("route {}: {}", index, msg)))?;
    }
    check_unique_ids(items.iter().filter_map(|item| item["id"].as_str()))
        .map_err(Error::Validation)?;

    serde_json::from_value(value.clone()).map_err(|err| Error::Validation(err.to_string()))
}

fn check_record_shape(item: &Value) -> std::result::Result<(), String> {
    if !item.is_object() {
        return Err("not an object".to_string());
    }
    for field in ["id", "name"] {
        match item[field].as_str() {
            Some(text) if !text.is_empty() => {}
            _ => return Err(format!("`{}` must be a non-empty string", field)),
        }
    }
    if !item["pathDescription"].is_string() {
        return Err("`pathDescription` must be a string".to_string());
    }
    match item["status"].as_str() {
        Some("open") | Some("blocked") => {}
        _ => return Err("`status` must be \"open\" or \"blocked\"".to_string()),
    }
    let coordinates = item["coordinates"]
        .as_array()
        .ok_or_else(|| "`coordinates` must be an array".to_string())?;
    if coordinates.len() == 1 {
        return Err("`coordinates` must be empty or hold at least two points".to_string());
    }
    for point in coordinates {
        let (Some(lat), Some(lng)) = (point["lat"].as_f64(), point["lng"].as_f64()) else {
            return Err("coordinate without numeric `lat`/`lng`".to_string());
        };
        if !RouteCoordinate::new(lat, lng).is_valid() {
            return Err(format!("coordinate ({}, {}) out of range", lat, lng));
        }
    }
    Ok(())
}

fn check_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> std::result::Result<(), String> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(format!("duplicate route id {:?}", id));
        }
    }
    Ok(())
}

/// Checks a single record against the data model invariants.
pub fn validate_record(record: &RouteRecord) -> Result<()> {
    if !is_valid_route_id(&record.id) {
        return Err(Error::Validation(format!(
            "route id {:?} must be non-empty and use only letters, digits, '-' and '_'",
            record.id
        )));
    }
    if record.name.is_empty() {
        return Err(Error::Validation(format!("route {} has an empty name", record.id)));
    }
    if record.coordinates.len() == 1 {
        return Err(Error::Validation(format!(
            "route {} must have zero or at least two coordinates",
            record.id
        )));
    }
    if let Some(bad) = record.coordinates.iter().find(|coord| !coord.is_valid()) {
        return Err(Error::Validation(format!(
            "route {} has out-of-range coordinate {}",
            record.id, bad
        )));
    }
    Ok(())
}

pub fn is_valid_route_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
