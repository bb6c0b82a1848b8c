//! Integration tests for the HTTP surface: health, routing, validation,
//! and the error envelope. These run without a database; anything that
//! would touch one reports degraded state or a database error instead.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_degraded_when_database_is_unreachable() {
    let app = build_test_app();
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}

// ---------------------------------------------------------------------------
// Routing basics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = build_test_app();
    let response = get(app, "/health").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Request validation and error envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn employee_listing_rejects_an_empty_address_list() {
    let app = build_test_app();
    let response = post_json(app, "/api/v1/employees", json!({ "addresses": [] })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "addresses must not be empty");
}

#[tokio::test]
async fn transfer_rejects_missing_employee_selection() {
    let app = build_test_app();
    let response = post_json(
        app,
        "/api/v1/transfer",
        json!({
            "source_ip": "10.0.0.1",
            "destination_ips": ["10.0.0.2"],
            "user_id": "hr-portal"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn transfer_rejects_missing_destination_selection() {
    let app = build_test_app();
    let response = post_json(
        app,
        "/api/v1/transfer",
        json!({
            "source_ip": "10.0.0.1",
            "employees": [{ "emp_no": "100", "emp_name": "Alex" }],
            "user_id": "hr-portal"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn machine_listing_surfaces_database_failure_as_internal_error() {
    let app = build_test_app();
    let response = get(app, "/api/v1/machines").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
}
