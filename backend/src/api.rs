//! Public API surface.
//!
//! Domain and wire types for library users. `Coil`, `CoilStats` and
//! `DailyOccupancy` are the JSON shapes the HTTP layer returns.

pub use crate::models::{ClosedRange, Coil, CoilFilter, CoilId, NewCoil, TimeWindow};
pub use crate::services::{CoilStats, DailyOccupancy};

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
