//! Content service backends
//!
//! - `SimulatedContentService` - in-process placeholder with fixed targets

pub mod simulated;

pub use simulated::SimulatedContentService;
