//! Domain services that operate on coil data independent of storage.

pub mod statistics;

pub use statistics::{compute_stats, daily_occupancy, overlaps_window, CoilStats, DailyOccupancy};
