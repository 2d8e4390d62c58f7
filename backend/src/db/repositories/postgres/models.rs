use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::coils;
use crate::models::{Coil, CoilId, NewCoil};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coils)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CoilRow {
    pub id: i64,
    pub length: f64,
    pub weight: f64,
    pub date_added: DateTime<Utc>,
    pub date_removed: Option<DateTime<Utc>>,
}

impl From<CoilRow> for Coil {
    fn from(row: CoilRow) -> Self {
        Coil {
            id: CoilId::new(row.id),
            length: row.length,
            weight: row.weight,
            date_added: row.date_added,
            date_removed: row.date_removed,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coils)]
pub struct NewCoilRow {
    pub length: f64,
    pub weight: f64,
    pub date_added: DateTime<Utc>,
    pub date_removed: Option<DateTime<Utc>>,
}

impl NewCoilRow {
    pub fn from_new(coil: &NewCoil, date_added: DateTime<Utc>) -> Self {
        Self {
            length: coil.length(),
            weight: coil.weight(),
            date_added,
            date_removed: None,
        }
    }
}
