//! PostgreSQL-backed zone catalogue adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ZoneRepository, ZoneRepositoryError};
use crate::domain::{NewZone, Zone};

use super::models::{NewZoneRow, ZoneRow};
use super::pool::{DbPool, PoolError};
use super::schema::incidents;

/// Diesel-backed implementation of the zone catalogue port.
#[derive(Clone)]
pub struct DieselZoneRepository {
    pool: DbPool,
}

impl DieselZoneRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ZoneRepositoryError {
    ZoneRepositoryError::connection(error.to_string())
}

/// Unique violations can only come from the title index, so they map to
/// the duplicate-title variant; everything else is an opaque query
/// failure.
fn map_diesel_error(error: diesel::result::Error) -> ZoneRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "zone query failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            ZoneRepositoryError::duplicate_title(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ZoneRepositoryError::connection("database connection closed")
        }
        other => ZoneRepositoryError::query(other.to_string()),
    }
}

#[async_trait]
impl ZoneRepository for DieselZoneRepository {
    async fn create(&self, zone: &NewZone) -> Result<Zone, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ZoneRow = diesel::insert_into(incidents::table)
            .values(NewZoneRow::from(zone))
            .returning(ZoneRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn get_by_id(&self, id: i32) -> Result<Zone, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ZoneRow> = incidents::table
            .find(id)
            .select(ZoneRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Zone::from).ok_or(ZoneRepositoryError::NotFound)
    }

    async fn paginate(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Zone>, i64), ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = incidents::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<ZoneRow> = incidents::table
            .order(incidents::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(ZoneRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok((rows.into_iter().map(Zone::from).collect(), total))
    }

    async fn delete(&self, id: i32) -> Result<(), ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(incidents::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(ZoneRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn full_update(&self, id: i32, fields: &NewZone) -> Result<Zone, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ZoneRow> = diesel::update(incidents::table.find(id))
            .set((
                NewZoneRow::from(fields),
                incidents::updated_at.eq(Utc::now()),
            ))
            .returning(ZoneRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Zone::from).ok_or(ZoneRepositoryError::NotFound)
    }
}
