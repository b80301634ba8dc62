//! tacna-navigator core
//!
//! Route-state reconciliation for an AI-assisted transit navigator: the
//! admin route store, the conceptual path request/response contract with its
//! fallback, and detailed path requests against a directions service.

pub mod admin;
pub mod config;
pub mod defaults;
pub mod directions;
pub mod error;
pub mod gemini;
pub mod haversine;
pub mod model;
pub mod navigator;
pub mod osrm;
pub mod polyline;
pub mod request;
pub mod response;
pub mod storage;
pub mod store;
pub mod traits;

pub use error::{Error, Result, StorageError};
