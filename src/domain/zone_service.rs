//! Zone catalogue orchestration: validation, persistence, cache-aside.
//!
//! Reads of single zones go through the cache; `full_update` and
//! `delete` invalidate the entry after the store call succeeds so a
//! successful mutation is never followed by a stale read. `create` and
//! `paginate` bypass the cache entirely.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::ports::{ZoneCache, ZoneRepository, ZoneRepositoryError};
use crate::domain::{Error, NewZone, Zone};

/// Cache key namespace for single-zone payloads.
const CACHE_KEY_PREFIX: &str = "incidentID:";

const DEFAULT_PAGE_LIMIT: i64 = 10;
const DEFAULT_PAGE: i64 = 1;

/// Raw input for `create` and `full_update`.
///
/// Fields arrive unvalidated from the HTTP adapter; the service owns
/// validation so every caller gets the same rules.
#[derive(Debug, Clone)]
pub struct UpsertZoneRequest {
    pub title: String,
    pub description: Option<String>,
    pub lat: f64,
    pub long: f64,
    pub radius_m: i32,
    pub active: Option<bool>,
}

/// Page metadata returned alongside a zone listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

/// One page of zones plus its pagination envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ZonePage {
    pub data: Vec<Zone>,
    pub pagination: Pagination,
}

/// Orchestrates zone CRUD against the repository and cache ports.
pub struct ZoneService {
    zones: Arc<dyn ZoneRepository>,
    cache: Arc<dyn ZoneCache>,
}

impl ZoneService {
    pub fn new(zones: Arc<dyn ZoneRepository>, cache: Arc<dyn ZoneCache>) -> Self {
        Self { zones, cache }
    }

    /// Create a zone. Duplicate titles surface as `ALREADY_EXISTS`.
    pub async fn create(&self, request: UpsertZoneRequest) -> Result<Zone, Error> {
        let fields = validate_upsert(&request)?;

        info!(title = %fields.title, "creating zone");
        let zone = self
            .zones
            .create(&fields)
            .await
            .map_err(map_repository_error)?;
        info!(id = zone.id, title = %zone.title, "zone created");
        Ok(zone)
    }

    /// Fetch one zone, consulting the cache first.
    pub async fn get_by_id(&self, raw_id: &str) -> Result<Zone, Error> {
        let id = parse_id(raw_id)?;
        let key = cache_key(id);

        if let Some(zone) = self.read_cached(&key).await {
            return Ok(zone);
        }

        info!(id, "fetching zone");
        let zone = self
            .zones
            .get_by_id(id)
            .await
            .map_err(map_repository_error)?;
        self.write_cache(&key, &zone).await;
        Ok(zone)
    }

    /// List zones newest-first with a pagination envelope.
    pub async fn paginate(
        &self,
        raw_limit: Option<&str>,
        raw_page: Option<&str>,
    ) -> Result<ZonePage, Error> {
        let limit = parse_page_param(raw_limit, "limit", DEFAULT_PAGE_LIMIT)?;
        let page = parse_page_param(raw_page, "page", DEFAULT_PAGE)?;
        let offset = (page - 1) * limit;

        info!(limit, page, "paginating zones");
        let (data, total) = self
            .zones
            .paginate(limit, offset)
            .await
            .map_err(map_repository_error)?;

        Ok(ZonePage {
            data,
            pagination: Pagination {
                total,
                page,
                limit,
                pages: (total + limit - 1) / limit,
            },
        })
    }

    /// Overwrite every mutable field of one zone.
    pub async fn full_update(
        &self,
        raw_id: &str,
        request: UpsertZoneRequest,
    ) -> Result<Zone, Error> {
        let id = parse_id(raw_id)?;
        let fields = validate_upsert(&request)?;

        info!(id, "updating zone");
        let zone = self
            .zones
            .full_update(id, &fields)
            .await
            .map_err(map_repository_error)?;
        self.invalidate_cache(&cache_key(id)).await;
        info!(id, "zone updated");
        Ok(zone)
    }

    /// Hard-delete one zone.
    pub async fn delete(&self, raw_id: &str) -> Result<(), Error> {
        let id = parse_id(raw_id)?;

        info!(id, "deleting zone");
        self.zones.delete(id).await.map_err(map_repository_error)?;
        self.invalidate_cache(&cache_key(id)).await;
        info!(id, "zone deleted");
        Ok(())
    }

    /// Best-effort cache read: backend and decode failures both fall
    /// through to the store.
    async fn read_cached(&self, key: &str) -> Option<Zone> {
        let payload = match self.cache.get(key).await {
            Ok(payload) => payload?,
            Err(cache_error) => {
                warn!(key, error = %cache_error, "zone cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&payload) {
            Ok(zone) => Some(zone),
            Err(decode_error) => {
                error!(key, error = %decode_error, "malformed zone payload in cache");
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, zone: &Zone) {
        let payload = match serde_json::to_vec(zone) {
            Ok(payload) => payload,
            Err(encode_error) => {
                error!(id = zone.id, error = %encode_error, "failed to encode zone for cache");
                return;
            }
        };
        if let Err(cache_error) = self.cache.save(key, &payload).await {
            warn!(id = zone.id, error = %cache_error, "failed to cache zone");
        }
    }

    async fn invalidate_cache(&self, key: &str) {
        match self.cache.delete(key).await {
            Ok(existed) => {
                if existed {
                    info!(key, "zone cache entry invalidated");
                }
            }
            Err(cache_error) => {
                warn!(key, error = %cache_error, "failed to invalidate zone cache entry");
            }
        }
    }
}

pub(crate) fn cache_key(id: i32) -> String {
    format!("{CACHE_KEY_PREFIX}{id}")
}

fn map_repository_error(repository_error: ZoneRepositoryError) -> Error {
    match repository_error {
        ZoneRepositoryError::NotFound => Error::not_found("zone not found"),
        ZoneRepositoryError::DuplicateTitle { .. } => {
            Error::already_exists("zone title already exists")
        }
        ZoneRepositoryError::Connection { message } => Error::service_unavailable(message),
        ZoneRepositoryError::Query { message } => Error::internal(message),
    }
}

fn validate_upsert(request: &UpsertZoneRequest) -> Result<NewZone, Error> {
    NewZone::try_from_parts(
        &request.title,
        request.description.clone(),
        request.lat,
        request.long,
        request.radius_m,
        request.active,
    )
    .map_err(|validation_error| Error::invalid_validation(validation_error.to_string()))
}

fn parse_id(raw: &str) -> Result<i32, Error> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::invalid_request("id must be a positive integer"))
}

fn parse_page_param(raw: Option<&str>, name: &str, default: i64) -> Result<i64, Error> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.parse::<i64>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| Error::invalid_request(format!("{name} must be a positive integer")))
}

#[cfg(test)]
pub(crate) use cache_key as zone_cache_key;
