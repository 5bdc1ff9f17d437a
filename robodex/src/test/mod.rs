
use crate::api::models::{
    robots::{BulkUploadResponse, RobotResponse},
    users::Role,
};
use crate::create_initial_admin_user;
use crate::test_utils::{add_auth_headers, create_test_app, create_test_user};
use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

async fn admin_password_hash(pool: &PgPool, email: &str) -> Option<String> {
    sqlx::query_scalar("SELECT password_hash FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("Failed to read password hash")
}

/// A minimal valid spec sheet for catalog writes
fn spec_sheet(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "manufacturer": "Acme Robotics",
        "type": "mobile_manipulator",
        "usable_payload": 80,
        "reach": 1300,
        "arm_dof": 7,
        "ros_compatible": true,
        "drive_system": "Differential drive",
        "force_sensor": true
    })
}

/// End-to-end integration test: full catalog lifecycle through the API
/// Follows a real editor journey: create, browse, inspect, amend, search, bulk load, retire
#[sqlx::test]
#[test_log::test]
async fn test_e2e_catalog_lifecycle(pool: PgPool) {
    let server = create_test_app(pool.clone()).await;

    // Step 1: Create an editor identity for the write endpoints
    let editor = create_test_user(&pool, Role::User).await;
    let (header_name, header_value) = add_auth_headers(&editor);

    // Step 2: Editor registers a robot
    let response = server
        .post("/api/v1/robots")
        .add_header(header_name.clone(), header_value.clone())
        .json(&spec_sheet("Fetch One"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: RobotResponse = response.json();
    assert_eq!(created.name, "Fetch One");
    assert_eq!(created.created_by, Some(editor.id), "Catalog entries record their author");

    // Step 3: Anonymous visitors can browse the catalog
    let response = server.get("/api/v1/robots").await;
    response.assert_status_ok();
    let listed: Vec<RobotResponse> = response.json();
    assert_eq!(listed.len(), 1);

    // Step 4: ...and inspect a single entry
    let response = server.get(&format!("/api/v1/robots/{}", created.id)).await;
    response.assert_status_ok();
    let fetched: Option<RobotResponse> = response.json();
    assert_eq!(fetched.expect("robot should exist").manufacturer.as_deref(), Some("Acme Robotics"));

    // Step 5: Editor amends the spec sheet; untouched fields survive
    let response = server
        .patch(&format!("/api/v1/robots/{}", created.id))
        .add_header(header_name.clone(), header_value.clone())
        .json(&json!({"usable_payload": 95, "max_speed": 1500}))
        .await;
    response.assert_status_ok();
    let updated: RobotResponse = response.json();
    assert_eq!(updated.usable_payload, Some(95));
    assert_eq!(updated.max_speed, Some(1500));
    assert_eq!(updated.arm_dof, Some(7), "Partial update must not clear unrelated fields");

    // Step 6: Structured search narrows the catalog
    let response = server
        .get("/api/v1/robots/search")
        .add_query_param("min_payload", 90)
        .add_query_param("ros_compatible", true)
        .await;
    response.assert_status_ok();
    let matches: Vec<RobotResponse> = response.json();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, created.id);

    let response = server.get("/api/v1/robots/search").add_query_param("min_payload", 200).await;
    response.assert_status_ok();
    let matches: Vec<RobotResponse> = response.json();
    assert!(matches.is_empty(), "No robot carries 200kg");

    // Step 7: Bulk load; valid sheets land, broken ones are reported
    let response = server
        .post("/api/v1/robots/bulk")
        .add_header(header_name.clone(), header_value.clone())
        .json(&json!({
            "robots": [
                spec_sheet("Bulk A"),
                spec_sheet("Bulk B"),
                {"manufacturer": "Nameless Industries"}
            ]
        }))
        .await;
    response.assert_status_ok();
    let tally: BulkUploadResponse = response.json();
    assert_eq!(tally.success, 2);
    assert_eq!(tally.failed, 1);
    assert_eq!(tally.errors.len(), 1);

    // Step 8: Retire the first robot; deletes are idempotent
    let response = server
        .delete(&format!("/api/v1/robots/{}", created.id))
        .add_header(header_name.clone(), header_value.clone())
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server
        .delete(&format!("/api/v1/robots/{}", created.id))
        .add_header(header_name.clone(), header_value.clone())
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    // Step 9: The retired entry reads back as null, the bulk entries remain
    let response = server.get(&format!("/api/v1/robots/{}", created.id)).await;
    response.assert_status_ok();
    let gone: Option<RobotResponse> = response.json();
    assert!(gone.is_none());

    let response = server.get("/api/v1/robots").await;
    response.assert_status_ok();
    let listed: Vec<RobotResponse> = response.json();
    assert_eq!(listed.len(), 2);
}

#[sqlx::test]
async fn test_write_endpoints_require_authentication(pool: PgPool) {
    let server = create_test_app(pool).await;

    server
        .post("/api/v1/robots")
        .json(&spec_sheet("Anonymous"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .patch("/api/v1/robots/1")
        .json(&json!({"name": "Renamed"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server.delete("/api/v1/robots/1").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/v1/robots/bulk")
        .json(&json!({"robots": []}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_admin_seeding_is_idempotent(pool: PgPool) {
    let email = "seeded-admin@example.com";

    let first_id = create_initial_admin_user(email, Some("first-password"), &pool)
        .await
        .expect("Failed to seed admin");
    let first_hash = admin_password_hash(&pool, email).await.expect("admin should have a password hash");

    // Running the seed again with a new password keeps the row and rotates the hash
    let second_id = create_initial_admin_user(email, Some("rotated-password"), &pool)
        .await
        .expect("Failed to re-seed admin");
    assert_eq!(second_id, first_id);
    let second_hash = admin_password_hash(&pool, email).await.expect("hash should survive re-seeding");
    assert_ne!(second_hash, first_hash);

    // Without a password the existing hash is left alone
    let third_id = create_initial_admin_user(email, None, &pool).await.expect("Failed to re-seed admin");
    assert_eq!(third_id, first_id);
    let third_hash = admin_password_hash(&pool, email).await.expect("hash should survive re-seeding");
    assert_eq!(third_hash, second_hash);
}

#[sqlx::test]
async fn test_admin_seeding_without_password(pool: PgPool) {
    let email = "passwordless-admin@example.com";

    create_initial_admin_user(email, None, &pool).await.expect("Failed to seed admin");

    assert!(
        admin_password_hash(&pool, email).await.is_none(),
        "Admin seeded without a password must not get a hash"
    );

    let (is_admin, role): (bool, Role) = sqlx::query_as("SELECT is_admin, role FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(&pool)
        .await
        .expect("Failed to read seeded admin");
    assert!(is_admin);
    assert_eq!(role, Role::Admin);
}

#[sqlx::test]
async fn test_healthz(pool: PgPool) {
    let server = create_test_app(pool).await;

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[sqlx::test]
async fn test_openapi_document_and_docs_ui(pool: PgPool) {
    let server = create_test_app(pool).await;

    let response = server.get("/api/v1/openapi.json").await;
    response.assert_status_ok();
    let document: serde_json::Value = response.json();
    assert_eq!(document["info"]["title"], "Robodex API");
    assert!(document["paths"]["/robots"].is_object());
    assert!(document["paths"]["/robots/nl-query"].is_object());

    let response = server.get("/docs").await;
    response.assert_status_ok();
}
