//! Integration tests for the `/persons` resource and its error envelope.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{body_json, build_test_app, delete, get, post_json};

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_list_persons(pool: PgPool) {
    let t = build_test_app(pool);

    let response = post_json(
        t.app.clone(),
        "/api/v1/persons",
        json!({ "name": "Ada Lovelace" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["name"], "Ada Lovelace");
    let id = created["data"]["id"].as_i64().unwrap();

    let response = get(t.app.clone(), "/api/v1/persons").await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let response = get(t.app, &format!("/api/v1/persons/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["id"], id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_person_name_is_rejected(pool: PgPool) {
    let t = build_test_app(pool);

    let response = post_json(t.app, "/api/v1/persons", json!({ "name": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_person_returns_not_found_envelope(pool: PgPool) {
    let t = build_test_app(pool);

    let response = get(t.app, "/api/v1/persons/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Person with id 999999 not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_person_returns_a_summary(pool: PgPool) {
    let t = build_test_app(pool);

    let response = post_json(
        t.app.clone(),
        "/api/v1/persons",
        json!({ "name": "Temp" }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete(t.app.clone(), &format!("/api/v1/persons/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["data"]["person_id"], id);
    assert_eq!(summary["data"]["encodings_deleted"], 0);
    assert_eq!(summary["data"]["faces_reverted"], 0);

    let response = get(t.app, &format!("/api/v1/persons/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn drift_report_is_empty_on_a_fresh_system(pool: PgPool) {
    let t = build_test_app(pool);

    let response = get(t.app, "/api/v1/maintenance/drift").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["local_only"].as_array().unwrap().len(), 0);
    assert_eq!(json["data"]["remote_only"].as_array().unwrap().len(), 0);
}
