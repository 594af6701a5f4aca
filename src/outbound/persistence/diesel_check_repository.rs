//! PostgreSQL-backed check log adapter.
//!
//! The decide-and-record path runs raw SQL because the containment test
//! lives in PostGIS: a zone matches when the query point is within the
//! zone's own `radius_m` of its centre, measured on the geography type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::sql_types::{BigInt, Bool, Double, Integer, Nullable, Text, Timestamptz};
use diesel::{OptionalExtension, QueryableByName};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{CheckRepository, CheckRepositoryError};
use crate::domain::{LocationCheck, ZoneStat};

use super::pool::{DbPool, PoolError};

/// Diesel-backed implementation of the check log port.
#[derive(Clone)]
pub struct DieselCheckRepository {
    pool: DbPool,
}

impl DieselCheckRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const NEAREST_ACTIVE_SQL: &str = r#"
SELECT id
FROM incidents
WHERE active = true
  AND ST_DWithin(
        geom,
        ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
        radius_m
      )
ORDER BY ST_Distance(
    geom,
    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography
)
LIMIT 1
"#;

const INSERT_CHECK_SQL: &str = r#"
INSERT INTO location_checks (user_id, lat, long, in_danger_zone, nearest_id)
VALUES ($1, $2, $3, $4, $5)
RETURNING id, checked_at
"#;

const AGGREGATE_SQL: &str = r#"
SELECT nearest_id AS zone_id, COUNT(DISTINCT user_id) AS user_count
FROM location_checks
WHERE in_danger_zone = true
  AND nearest_id IS NOT NULL
  AND checked_at >= now() - ($1 * interval '1 minute')
GROUP BY nearest_id
ORDER BY nearest_id ASC
"#;

#[derive(QueryableByName)]
struct NearestZoneRow {
    #[diesel(sql_type = Integer)]
    id: i32,
}

#[derive(QueryableByName)]
struct InsertedCheckRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Timestamptz)]
    checked_at: DateTime<Utc>,
}

#[derive(QueryableByName)]
struct ZoneStatRow {
    #[diesel(sql_type = Integer)]
    zone_id: i32,
    #[diesel(sql_type = BigInt)]
    user_count: i64,
}

fn map_pool_error(error: PoolError) -> CheckRepositoryError {
    CheckRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> CheckRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CheckRepositoryError::connection("database connection closed")
        }
        other => CheckRepositoryError::query(other.to_string()),
    }
}

#[async_trait]
impl CheckRepository for DieselCheckRepository {
    async fn record_check(
        &self,
        user_id: &str,
        lat: f64,
        long: f64,
    ) -> Result<LocationCheck, CheckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The lookup and the insert commit together so a check row never
        // references a decision that was not actually taken.
        let check = conn
            .transaction::<LocationCheck, diesel::result::Error, _>(|conn| {
                async move {
                    let nearest: Option<NearestZoneRow> = diesel::sql_query(NEAREST_ACTIVE_SQL)
                        .bind::<Double, _>(long)
                        .bind::<Double, _>(lat)
                        .get_result(conn)
                        .await
                        .optional()?;
                    let nearest_id = nearest.map(|row| row.id);

                    let inserted: InsertedCheckRow = diesel::sql_query(INSERT_CHECK_SQL)
                        .bind::<Text, _>(user_id)
                        .bind::<Double, _>(lat)
                        .bind::<Double, _>(long)
                        .bind::<Bool, _>(nearest_id.is_some())
                        .bind::<Nullable<Integer>, _>(nearest_id)
                        .get_result(conn)
                        .await?;

                    Ok(LocationCheck {
                        id: inserted.id,
                        user_id: user_id.to_owned(),
                        lat,
                        long,
                        in_danger_zone: nearest_id.is_some(),
                        nearest_id,
                        checked_at: inserted.checked_at,
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(check)
    }

    async fn aggregate_by_zone(
        &self,
        window_minutes: i64,
    ) -> Result<Vec<ZoneStat>, CheckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ZoneStatRow> = diesel::sql_query(AGGREGATE_SQL)
            .bind::<BigInt, _>(window_minutes)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ZoneStat {
                zone_id: row.zone_id,
                user_count: row.user_count,
            })
            .collect())
    }
}
