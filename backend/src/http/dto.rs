//! Data Transfer Objects for the HTTP API.
//!
//! Responses reuse the domain types ([`Coil`], [`CoilStats`]) directly since
//! they already serialize to the wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::api::{Coil, CoilStats};
use crate::models::{parse_timestamp, ClosedRange, CoilFilter, CoilId};

/// Request body for `POST /coils/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCoilRequest {
    pub length: f64,
    pub weight: f64,
}

/// Query parameters for `GET /coils/`.
///
/// Each filter applies only when both of its bounds are supplied. Timestamps
/// stay as strings here and go through [`parse_timestamp`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoilListQuery {
    #[serde(default)]
    pub id_min: Option<i64>,
    #[serde(default)]
    pub id_max: Option<i64>,
    #[serde(default)]
    pub weight_min: Option<f64>,
    #[serde(default)]
    pub weight_max: Option<f64>,
    #[serde(default)]
    pub length_min: Option<f64>,
    #[serde(default)]
    pub length_max: Option<f64>,
    #[serde(default)]
    pub date_added_min: Option<String>,
    #[serde(default)]
    pub date_added_max: Option<String>,
    #[serde(default)]
    pub date_removed_min: Option<String>,
    #[serde(default)]
    pub date_removed_max: Option<String>,
}

impl CoilListQuery {
    /// Build the repository filter.
    ///
    /// Timestamps are parsed only for a range whose bounds are both present;
    /// a lone bound is ignored without being looked at.
    pub fn into_filter(self) -> Result<CoilFilter, String> {
        let date_added_range = parse_range(
            self.date_added_min.as_deref(),
            self.date_added_max.as_deref(),
        )?;
        let date_removed_range = parse_range(
            self.date_removed_min.as_deref(),
            self.date_removed_max.as_deref(),
        )?;

        Ok(CoilFilter {
            id_range: ClosedRange::from_bounds(
                self.id_min.map(CoilId::new),
                self.id_max.map(CoilId::new),
            ),
            weight_range: ClosedRange::from_bounds(self.weight_min, self.weight_max),
            length_range: ClosedRange::from_bounds(self.length_min, self.length_max),
            date_added_range,
            date_removed_range,
        })
    }
}

/// Query parameters for `GET /statistics/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl StatisticsQuery {
    /// Parse both window bounds. Both are required; ordering is checked later.
    pub fn window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        let start = required(self.start_date.as_deref(), "start_date")?;
        let end = required(self.end_date.as_deref(), "end_date")?;
        Ok((start, end))
    }
}

fn parse_range(
    min: Option<&str>,
    max: Option<&str>,
) -> Result<Option<ClosedRange<DateTime<Utc>>>, String> {
    match (min, max) {
        (Some(min), Some(max)) => Ok(Some(ClosedRange::new(
            parse_timestamp(min)?,
            parse_timestamp(max)?,
        ))),
        _ => Ok(None),
    }
}

fn required(raw: Option<&str>, name: &str) -> Result<DateTime<Utc>, String> {
    match raw {
        Some(value) if !value.trim().is_empty() => {
            parse_timestamp(value).map_err(|e| format!("{}: {}", name, e))
        }
        _ => Err(format!("Query parameter '{}' is required", name)),
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Database connection status
    pub database: String,
}
