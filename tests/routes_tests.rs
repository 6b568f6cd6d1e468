// SPDX-License-Identifier: MIT

//! Route-level tests: scheduler job guards and the location-change hook.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Datelike, Utc};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn poll_alerts_without_scheduler_header_is_forbidden() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/poll-alerts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn poll_alerts_with_wrong_job_name_is_forbidden() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/poll-alerts")
                .header("x-cloudscheduler-jobname", "some-other-job")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn poll_alerts_reports_cycle_failure_when_feed_unreachable() {
    let (app, _, _) = common::create_test_app();

    // The test feed client points at nothing; the fetch failure aborts the
    // cycle and surfaces as a 500 so the scheduler retries.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/poll-alerts")
                .header("x-cloudscheduler-jobname", "poll-hazard-alerts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn reset_checklists_runs_with_valid_job_header() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/reset-checklists")
                .header("x-cloudscheduler-jobname", "reset-recurring-checklists")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn hook_ignores_unchanged_country_code() {
    let (app, store, _) = common::create_test_app();
    store.insert_user(common::user("user-1", "PH", None));

    let payload = json!({
        "user_id": "user-1",
        "before": { "country_code": "PH", "latitude": 14.6, "longitude": 121.0 },
        "after": { "country_code": "PH", "latitude": 14.7, "longitude": 121.1 }
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/user-location")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.notification_count(), 0);
}

#[tokio::test]
async fn hook_notifies_on_country_change() {
    let (app, store, push) = common::create_test_app();
    store.insert_user(common::user("user-1", "JP", Some("token-1")));

    // Alert ongoing today, affecting the user's new country
    let today = Utc::now().date_naive();
    store.insert_alert(common::stored_alert(
        400,
        1,
        "JP",
        today.with_day(1).unwrap(),
        today,
    ));

    let payload = json!({
        "user_id": "user-1",
        "before": { "country_code": "PH", "latitude": 14.6, "longitude": 121.0 },
        "after": { "country_code": "JP", "latitude": 35.6, "longitude": 139.7 }
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/user-location")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.notification("user-1", "400-1-user-1").is_some());
    assert_eq!(push.batch_sizes(), vec![1]);
}

#[tokio::test]
async fn hook_ignores_pure_case_change_in_country_code() {
    let (app, store, push) = common::create_test_app();
    store.insert_user(common::user("user-1", "JP", Some("token-1")));

    // An ongoing alert exists, so a real change would have notified
    let today = Utc::now().date_naive();
    store.insert_alert(common::stored_alert(
        410,
        1,
        "JP",
        today.with_day(1).unwrap(),
        today,
    ));

    let payload = json!({
        "user_id": "user-1",
        "before": { "country_code": "jp", "latitude": 35.6, "longitude": 139.7 },
        "after": { "country_code": "JP", "latitude": 35.6, "longitude": 139.7 }
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/user-location")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.notification_count(), 0);
    assert!(push.batch_sizes().is_empty());
}

#[tokio::test]
async fn hook_without_new_location_is_a_no_op() {
    let (app, store, _) = common::create_test_app();

    let payload = json!({
        "user_id": "user-1",
        "before": { "country_code": "PH", "latitude": 14.6, "longitude": 121.0 },
        "after": null
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/user-location")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.notification_count(), 0);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
