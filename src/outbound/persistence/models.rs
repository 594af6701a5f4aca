//! Row types bridging Diesel and the domain model.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{NewZone, Zone};

use super::schema::incidents;

/// Read shape of one `incidents` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = incidents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ZoneRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub long: f64,
    pub radius_m: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ZoneRow> for Zone {
    fn from(row: ZoneRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            lat: row.lat,
            long: row.long,
            radius_m: row.radius_m,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert shape for a new zone; ids and timestamps come from the store.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = incidents)]
pub struct NewZoneRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub lat: f64,
    pub long: f64,
    pub radius_m: i32,
    pub active: bool,
}

impl<'a> From<&'a NewZone> for NewZoneRow<'a> {
    fn from(fields: &'a NewZone) -> Self {
        Self {
            title: &fields.title,
            description: &fields.description,
            lat: fields.lat,
            long: fields.long,
            radius_m: fields.radius_m,
            active: fields.active,
        }
    }
}
