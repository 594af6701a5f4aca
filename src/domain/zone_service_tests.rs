//! Tests for zone CRUD orchestration and cache-aside behaviour.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use crate::domain::ports::{
    MockZoneCache, MockZoneRepository, ZoneCacheError, ZoneRepositoryError,
};
use crate::domain::zone_service::zone_cache_key;
use crate::domain::{
    DESCRIPTION_PLACEHOLDER, ErrorCode, UpsertZoneRequest, Zone, ZoneService,
};

fn stored_zone(id: i32, title: &str) -> Zone {
    let now = Utc::now();
    Zone {
        id,
        title: title.to_owned(),
        description: DESCRIPTION_PLACEHOLDER.to_owned(),
        lat: 50.0,
        long: 50.0,
        radius_m: 1000,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn upsert_request(title: &str) -> UpsertZoneRequest {
    UpsertZoneRequest {
        title: title.to_owned(),
        description: None,
        lat: 50.0,
        long: 50.0,
        radius_m: 1000,
        active: None,
    }
}

fn service(zones: MockZoneRepository, cache: MockZoneCache) -> ZoneService {
    ZoneService::new(Arc::new(zones), Arc::new(cache))
}

#[tokio::test]
async fn create_applies_defaults_and_returns_the_stored_zone() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_create()
        .times(1)
        .withf(|fields| {
            fields.description == DESCRIPTION_PLACEHOLDER && fields.active && fields.title == "Z"
        })
        .returning(|_| Ok(stored_zone(1, "Z")));

    let created = service(zones, MockZoneCache::new())
        .create(upsert_request("Z"))
        .await
        .expect("create succeeds");

    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn duplicate_title_maps_to_already_exists() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_create()
        .times(1)
        .returning(|_| Err(ZoneRepositoryError::duplicate_title("unique violation")));

    let error = service(zones, MockZoneCache::new())
        .create(upsert_request("Z"))
        .await
        .expect_err("duplicate title rejected");

    assert_eq!(error.code(), ErrorCode::AlreadyExists);
}

#[rstest]
#[case::blank_title(upsert_request("  "))]
#[case::small_radius(UpsertZoneRequest { radius_m: 4, ..upsert_request("Z") })]
#[case::bad_latitude(UpsertZoneRequest { lat: 91.0, ..upsert_request("Z") })]
#[tokio::test]
async fn invalid_input_never_reaches_the_store(#[case] request: UpsertZoneRequest) {
    let mut zones = MockZoneRepository::new();
    zones.expect_create().times(0);

    let error = service(zones, MockZoneCache::new())
        .create(request)
        .await
        .expect_err("validation rejects the input");

    assert_eq!(error.code(), ErrorCode::InvalidValidation);
}

#[tokio::test]
async fn get_by_id_returns_cached_zone_without_touching_the_store() {
    let zone = stored_zone(7, "Z");
    let payload = serde_json::to_vec(&zone).expect("zone encodes");

    let mut zones = MockZoneRepository::new();
    zones.expect_get_by_id().times(0);
    let mut cache = MockZoneCache::new();
    cache
        .expect_get()
        .times(1)
        .withf(|key| key == zone_cache_key(7))
        .returning(move |_| Ok(Some(payload.clone())));

    let fetched = service(zones, cache)
        .get_by_id("7")
        .await
        .expect("cache hit");

    assert_eq!(fetched, zone);
}

#[tokio::test]
async fn cache_miss_falls_through_and_repopulates() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_get_by_id()
        .times(1)
        .withf(|id| *id == 7)
        .returning(|_| Ok(stored_zone(7, "Z")));
    let mut cache = MockZoneCache::new();
    cache.expect_get().times(1).returning(|_| Ok(None));
    cache
        .expect_save()
        .times(1)
        .withf(|key, payload| {
            key == zone_cache_key(7) && serde_json::from_slice::<Zone>(payload).is_ok()
        })
        .returning(|_, _| Ok(()));

    let fetched = service(zones, cache)
        .get_by_id("7")
        .await
        .expect("store fallback");

    assert_eq!(fetched.id, 7);
}

#[tokio::test]
async fn malformed_cache_payload_falls_through_to_the_store() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_get_by_id()
        .times(1)
        .returning(|_| Ok(stored_zone(7, "Z")));
    let mut cache = MockZoneCache::new();
    cache
        .expect_get()
        .times(1)
        .returning(|_| Ok(Some(b"not json".to_vec())));
    cache.expect_save().times(1).returning(|_, _| Ok(()));

    let fetched = service(zones, cache)
        .get_by_id("7")
        .await
        .expect("decode error is non-fatal");

    assert_eq!(fetched.id, 7);
}

#[tokio::test]
async fn cache_read_error_is_non_fatal() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_get_by_id()
        .times(1)
        .returning(|_| Ok(stored_zone(7, "Z")));
    let mut cache = MockZoneCache::new();
    cache
        .expect_get()
        .times(1)
        .returning(|_| Err(ZoneCacheError::backend("connection refused")));
    cache.expect_save().times(1).returning(|_, _| Ok(()));

    let fetched = service(zones, cache)
        .get_by_id("7")
        .await
        .expect("cache failure downgrades to a store read");

    assert_eq!(fetched.id, 7);
}

#[tokio::test]
async fn cache_write_failure_is_non_fatal() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_get_by_id()
        .times(1)
        .returning(|_| Ok(stored_zone(7, "Z")));
    let mut cache = MockZoneCache::new();
    cache.expect_get().times(1).returning(|_| Ok(None));
    cache
        .expect_save()
        .times(1)
        .returning(|_, _| Err(ZoneCacheError::backend("connection refused")));

    assert!(service(zones, cache).get_by_id("7").await.is_ok());
}

#[rstest]
#[case::not_a_number("seven")]
#[case::negative("-3")]
#[case::zero("0")]
#[tokio::test]
async fn unparseable_ids_are_invalid_requests(#[case] raw_id: &str) {
    let mut zones = MockZoneRepository::new();
    zones.expect_get_by_id().times(0);
    let mut cache = MockZoneCache::new();
    cache.expect_get().times(0);

    let error = service(zones, cache)
        .get_by_id(raw_id)
        .await
        .expect_err("bad id rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn full_update_invalidates_the_cache_after_success() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_full_update()
        .times(1)
        .withf(|id, fields| *id == 7 && fields.title == "renamed")
        .returning(|_, _| Ok(stored_zone(7, "renamed")));
    let mut cache = MockZoneCache::new();
    cache
        .expect_delete()
        .times(1)
        .withf(|key| key == zone_cache_key(7))
        .returning(|_| Ok(true));

    let updated = service(zones, cache)
        .full_update("7", upsert_request("renamed"))
        .await
        .expect("update succeeds");

    assert_eq!(updated.title, "renamed");
}

#[tokio::test]
async fn failed_update_leaves_the_cache_alone() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_full_update()
        .times(1)
        .returning(|_, _| Err(ZoneRepositoryError::NotFound));
    let mut cache = MockZoneCache::new();
    cache.expect_delete().times(0);

    let error = service(zones, cache)
        .full_update("7", upsert_request("renamed"))
        .await
        .expect_err("missing zone");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_invalidates_the_cache_after_success() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_delete()
        .times(1)
        .withf(|id| *id == 7)
        .returning(|_| Ok(()));
    let mut cache = MockZoneCache::new();
    cache
        .expect_delete()
        .times(1)
        .withf(|key| key == zone_cache_key(7))
        .returning(|_| Ok(true));

    service(zones, cache)
        .delete("7")
        .await
        .expect("delete succeeds");
}

#[tokio::test]
async fn cache_invalidation_error_does_not_fail_the_mutation() {
    let mut zones = MockZoneRepository::new();
    zones.expect_delete().times(1).returning(|_| Ok(()));
    let mut cache = MockZoneCache::new();
    cache
        .expect_delete()
        .times(1)
        .returning(|_| Err(ZoneCacheError::backend("connection refused")));

    assert!(service(zones, cache).delete("7").await.is_ok());
}

/// Minimal working cache double for end-to-end invalidation coverage.
#[derive(Default)]
struct InMemoryCache {
    entries: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

#[async_trait::async_trait]
impl crate::domain::ports::ZoneCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ZoneCacheError> {
        Ok(self.entries.lock().expect("cache mutex").get(key).cloned())
    }

    async fn save(&self, key: &str, payload: &[u8]) -> Result<(), ZoneCacheError> {
        self.entries
            .lock()
            .expect("cache mutex")
            .insert(key.to_owned(), payload.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, ZoneCacheError> {
        Ok(self
            .entries
            .lock()
            .expect("cache mutex")
            .remove(key)
            .is_some())
    }
}

#[tokio::test]
async fn update_after_cached_read_is_visible_immediately() {
    let store_reads = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let mut zones = MockZoneRepository::new();
    let reads = Arc::clone(&store_reads);
    zones.expect_get_by_id().times(2).returning(move |_| {
        let title = if reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
            "before"
        } else {
            "after"
        };
        Ok(stored_zone(7, title))
    });
    zones
        .expect_full_update()
        .times(1)
        .returning(|_, _| Ok(stored_zone(7, "after")));

    let service = ZoneService::new(Arc::new(zones), Arc::new(InMemoryCache::default()));

    // First read populates the cache; the second is served from it.
    assert_eq!(service.get_by_id("7").await.expect("first read").title, "before");
    assert_eq!(service.get_by_id("7").await.expect("cached read").title, "before");

    service
        .full_update("7", upsert_request("after"))
        .await
        .expect("update succeeds");

    // The stale entry is gone, so this read reaches the store again and
    // sees the new title.
    assert_eq!(service.get_by_id("7").await.expect("fresh read").title, "after");
}

#[tokio::test]
async fn paginate_computes_offset_and_page_count() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_paginate()
        .times(1)
        .withf(|limit, offset| *limit == 10 && *offset == 20)
        .returning(|_, _| Ok((vec![stored_zone(1, "Z")], 21)));

    let page = service(zones, MockZoneCache::new())
        .paginate(Some("10"), Some("3"))
        .await
        .expect("paginate succeeds");

    assert_eq!(page.pagination.total, 21);
    assert_eq!(page.pagination.page, 3);
    assert_eq!(page.pagination.limit, 10);
    assert_eq!(page.pagination.pages, 3);
}

#[tokio::test]
async fn paginate_defaults_when_params_are_absent() {
    let mut zones = MockZoneRepository::new();
    zones
        .expect_paginate()
        .times(1)
        .withf(|limit, offset| *limit == 10 && *offset == 0)
        .returning(|_, _| Ok((Vec::new(), 0)));

    let page = service(zones, MockZoneCache::new())
        .paginate(None, None)
        .await
        .expect("paginate succeeds");

    assert_eq!(page.pagination.pages, 0);
    assert!(page.data.is_empty());
}

#[rstest]
#[case::bad_limit(Some("ten"), None)]
#[case::zero_limit(Some("0"), None)]
#[case::negative_page(None, Some("-1"))]
#[tokio::test]
async fn bad_pagination_params_are_invalid_requests(
    #[case] raw_limit: Option<&str>,
    #[case] raw_page: Option<&str>,
) {
    let mut zones = MockZoneRepository::new();
    zones.expect_paginate().times(0);

    let error = service(zones, MockZoneCache::new())
        .paginate(raw_limit, raw_page)
        .await
        .expect_err("bad params rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}
