//! Handler tests for the check and stats routes.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::Utc;

use crate::domain::ports::{
    FixtureZoneCache, MockCheckRepository, MockDeliveryQueue, MockZoneRepository,
};
use crate::domain::{CheckService, LocationCheck, ZoneService, ZoneStat};
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{checks, health};

fn recorded_check(nearest_id: Option<i32>) -> LocationCheck {
    LocationCheck {
        id: 10,
        user_id: "user-1".to_owned(),
        lat: 50.0,
        long: 50.0,
        in_danger_zone: nearest_id.is_some(),
        nearest_id,
        checked_at: Utc::now(),
    }
}

fn state_with(repo: MockCheckRepository, queue: MockDeliveryQueue) -> web::Data<HttpState> {
    let zone_service = Arc::new(ZoneService::new(
        Arc::new(MockZoneRepository::new()),
        Arc::new(FixtureZoneCache),
    ));
    let check_service = Arc::new(CheckService::new(Arc::new(repo), Arc::new(queue)));
    web::Data::new(HttpState::new(zone_service, check_service, 60))
}

macro_rules! check_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .service(
                    web::scope("/api/v1")
                        .service(checks::check_location)
                        .service(checks::zone_stats)
                        .service(health::health),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn in_zone_check_reports_the_nearest_zone() {
    let mut repo = MockCheckRepository::new();
    repo.expect_record_check()
        .times(1)
        .returning(|_, _, _| Ok(recorded_check(Some(7))));
    let mut queue = MockDeliveryQueue::new();
    queue.expect_enqueue().times(1).returning(|_| Ok(()));
    let app = check_app!(state_with(repo, queue));

    let request = test::TestRequest::post()
        .uri("/api/v1/location/check")
        .set_json(serde_json::json!({"user_id": "user-1", "lat": 50.0, "long": 50.0}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let check: LocationCheck = test::read_body_json(response).await;
    assert!(check.in_danger_zone);
    assert_eq!(check.nearest_id, Some(7));
}

#[actix_web::test]
async fn out_of_range_latitude_yields_400_validation_envelope() {
    let mut repo = MockCheckRepository::new();
    repo.expect_record_check().times(0);
    let queue = MockDeliveryQueue::new();
    let app = check_app!(state_with(repo, queue));

    let request = test::TestRequest::post()
        .uri("/api/v1/location/check")
        .set_json(serde_json::json!({"user_id": "user-1", "lat": 90.5, "long": 50.0}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_VALIDATION");
}

#[actix_web::test]
async fn stats_use_the_configured_window() {
    let mut repo = MockCheckRepository::new();
    repo.expect_aggregate_by_zone()
        .times(1)
        .withf(|window| *window == 60)
        .returning(|_| {
            Ok(vec![ZoneStat {
                zone_id: 1,
                user_count: 2,
            }])
        });
    let queue = MockDeliveryQueue::new();
    let app = check_app!(state_with(repo, queue));

    let request = test::TestRequest::get()
        .uri("/api/v1/incidents/stats")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["stats"][0]["zone_id"], 1);
    assert_eq!(body["stats"][0]["user_count"], 2);
}

#[actix_web::test]
async fn health_answers_200() {
    let repo = MockCheckRepository::new();
    let queue = MockDeliveryQueue::new();
    let app = check_app!(state_with(repo, queue));

    let request = test::TestRequest::get()
        .uri("/api/v1/system/health")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
}
