//! Ports to the navigator's external collaborators.
//!
//! The core never talks to a browser, an LLM or a directions service
//! directly. Concrete adapters implement these traits; tests implement them
//! with in-memory mocks.

use std::sync::mpsc::Receiver;

use serde_json::Value;

use crate::directions::{DirectionsRequest, DirectionsResponse};
use crate::error::StorageError;
use crate::request::ConceptualPathRequest;

/// Change to a storage key made by another session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// Raw new payload, `None` when the key was removed.
    pub new_value: Option<String>,
}

/// Key-value persistence with change notifications.
pub trait RouteStorage {
    /// Raw payload stored under `key`, or `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Subscribes to writes of `key` made by other sessions.
    ///
    /// Writes made through this handle are not echoed back.
    fn subscribe(&self, key: &str) -> Receiver<StorageEvent>;
}

/// The generative-AI collaborator.
pub trait PathSuggester {
    /// Raw structured output for `request`.
    ///
    /// `None` means the collaborator produced nothing usable (transport
    /// failure, refusal, unparseable text). The output is untrusted either
    /// way and goes through [`validate_response`](crate::response::validate_response).
    fn suggest(&self, request: &ConceptualPathRequest) -> Option<Value>;
}

/// The mapping-directions collaborator.
pub trait DirectionsProvider {
    /// Routes `request`. Failures are reported through the response status.
    fn route(&self, request: &DirectionsRequest) -> DirectionsResponse;
}
