//! Coil entity: a physical inventory unit tracked from arrival to removal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coil identifier (database primary key, assigned by the store).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CoilId(pub i64);

impl CoilId {
    pub fn new(value: i64) -> Self {
        CoilId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CoilId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CoilId> for i64 {
    fn from(id: CoilId) -> Self {
        id.0
    }
}

/// A stored coil.
///
/// `date_removed` is `None` while the coil is active. Once set it is never
/// cleared and is always `>= date_added`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coil {
    pub id: CoilId,
    pub length: f64,
    pub weight: f64,
    pub date_added: DateTime<Utc>,
    pub date_removed: Option<DateTime<Utc>>,
}

impl Coil {
    /// True while the coil has not been removed.
    pub fn is_active(&self) -> bool {
        self.date_removed.is_none()
    }

    /// True if the coil was in the warehouse at `instant`.
    ///
    /// Arrival is inclusive, removal exclusive: a coil removed exactly at
    /// `instant` no longer counts.
    pub fn is_active_at(&self, instant: DateTime<Utc>) -> bool {
        self.date_added <= instant && self.date_removed.is_none_or(|removed| removed > instant)
    }

    /// Seconds between arrival and removal, `None` for active coils.
    pub fn storage_seconds(&self) -> Option<f64> {
        let removed = self.date_removed?;
        let delta = removed - self.date_added;
        Some(match delta.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => delta.num_seconds() as f64,
        })
    }
}

/// Validated input for creating a coil.
///
/// Fields are private so the only way to obtain one is through
/// [`NewCoil::new`], which enforces `length > 0` and `weight > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewCoil {
    length: f64,
    weight: f64,
}

impl NewCoil {
    pub fn new(length: f64, weight: f64) -> Result<Self, String> {
        // Written as `!(x > 0.0)` so NaN is rejected too.
        if !(length > 0.0) {
            return Err(format!("length must be greater than 0 (got {})", length));
        }
        if !(weight > 0.0) {
            return Err(format!("weight must be greater than 0 (got {})", weight));
        }
        Ok(Self { length, weight })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Materialize the coil once the store has assigned an id.
    pub fn into_coil(self, id: CoilId, date_added: DateTime<Utc>) -> Coil {
        Coil {
            id,
            length: self.length,
            weight: self.weight,
            date_added,
            date_removed: None,
        }
    }
}
