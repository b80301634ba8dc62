//! Scripted collaborators.

#![allow(dead_code)]

use std::cell::RefCell;

use serde_json::Value;

use tacna_navigator::directions::{DirectionsRequest, DirectionsResponse};
use tacna_navigator::request::ConceptualPathRequest;
use tacna_navigator::traits::{DirectionsProvider, PathSuggester};

/// Returns a fixed raw response and records every request.
pub struct ScriptedSuggester {
    pub response: RefCell<Option<Value>>,
    pub requests: RefCell<Vec<ConceptualPathRequest>>,
}

impl ScriptedSuggester {
    pub fn new(response: Option<Value>) -> Self {
        Self {
            response: RefCell::new(response),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn set_response(&self, response: Option<Value>) {
        *self.response.borrow_mut() = response;
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl PathSuggester for ScriptedSuggester {
    fn suggest(&self, request: &ConceptualPathRequest) -> Option<Value> {
        self.requests.borrow_mut().push(request.clone());
        self.response.borrow().clone()
    }
}

/// Returns a fixed directions response and records every request.
pub struct ScriptedDirections {
    pub response: RefCell<DirectionsResponse>,
    pub requests: RefCell<Vec<DirectionsRequest>>,
}

impl ScriptedDirections {
    pub fn new(response: DirectionsResponse) -> Self {
        Self {
            response: RefCell::new(response),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn set_response(&self, response: DirectionsResponse) {
        *self.response.borrow_mut() = response;
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl DirectionsProvider for ScriptedDirections {
    fn route(&self, request: &DirectionsRequest) -> DirectionsResponse {
        self.requests.borrow_mut().push(request.clone());
        self.response.borrow().clone()
    }
}
