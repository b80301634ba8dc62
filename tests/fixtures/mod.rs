//! Test fixtures for tacna-navigator.
//!
//! Provides:
//! - Real Tacna locations
//! - Scripted AI and directions collaborators that record their calls

pub mod collaborators;
pub mod tacna_locations;

#[allow(unused_imports)]
pub use collaborators::*;
#[allow(unused_imports)]
pub use tacna_locations::*;
