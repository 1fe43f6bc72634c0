//! Integration tests for the asset catalog endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use qm_core::record::AssetRecord;
use qm_db::repositories::AssetRepo;

fn record(tag: &str, user: &str, department: &str) -> AssetRecord {
    AssetRecord {
        asset_tag: Some(tag.to_string()),
        computer_name: Some(format!("PC-{tag}")),
        serial_number: None,
        department: Some(department.to_string()),
        assigned_user_name: Some(user.to_string()),
        assigned_user_id: None,
        operating_system: None,
        notes: None,
        status: "active".to_string(),
    }
}

async fn seed(pool: &PgPool) -> i64 {
    let first = AssetRepo::create_from_record(pool, &record("LT-001", "Ada", "ENG"))
        .await
        .unwrap();
    AssetRepo::create_from_record(pool, &record("LT-002", "Grace", "FINANCE"))
        .await
        .unwrap();
    first.id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_with_search_and_filters(pool: PgPool) {
    seed(&pool).await;
    let (app, _uploads) = common::build_test_app(pool);

    let body = common::body_json(common::get(&app, "/api/v1/assets?search=ada").await).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["asset_tag"], "LT-001");

    let body =
        common::body_json(common::get(&app, "/api/v1/assets?department=FINANCE").await).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["asset_tag"], "LT-002");

    let body = common::body_json(
        common::get(&app, "/api/v1/assets?sort_by=asset_tag&sort_dir=desc&per_page=1").await,
    )
    .await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["items"][0]["asset_tag"], "LT-002");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_asset_and_404(pool: PgPool) {
    let id = seed(&pool).await;
    let (app, _uploads) = common::build_test_app(pool);

    let response = common::get(&app, &format!("/api/v1/assets/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["asset_tag"], "LT-001");

    let response = common::get(&app, "/api/v1/assets/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_updates_fields_and_audit_trail(pool: PgPool) {
    let id = seed(&pool).await;
    let (app, _uploads) = common::build_test_app(pool);

    let response = common::patch_json(
        &app,
        &format!("/api/v1/assets/{id}"),
        json!({ "changed_by": "alice", "department": "NEWS", "location_room": "B204" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["department"], "NEWS");
    assert_eq!(body["data"]["location_room"], "B204");

    // One history entry for the monitored field; location_room is not
    // monitored and produces none.
    let history =
        common::body_json(common::get(&app, &format!("/api/v1/assets/{id}/history")).await).await;
    let entries = history["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["change_type"], "update");
    assert_eq!(entries[0]["field_name"], "department");
    assert_eq!(entries[0]["old_value"], "ENG");
    assert_eq!(entries[0]["new_value"], "NEWS");
    assert_eq!(entries[0]["changed_by"], "alice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_requires_changed_by(pool: PgPool) {
    let id = seed(&pool).await;
    let (app, _uploads) = common::build_test_app(pool);

    let response = common::patch_json(
        &app,
        &format!("/api/v1/assets/{id}"),
        json!({ "changed_by": "", "department": "NEWS" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_aggregates_catalog_counts(pool: PgPool) {
    let id = seed(&pool).await;
    let mut spare = record("LT-003", "", "ENG");
    spare.assigned_user_name = None;
    let spare = AssetRepo::create_from_record(&pool, &spare).await.unwrap();
    let (app, _uploads) = common::build_test_app(pool);

    // A refresh date inside the 90-day lookahead window.
    let due = (chrono::Utc::now().date_naive() + chrono::Duration::days(30)).to_string();
    let response = common::patch_json(
        &app,
        &format!("/api/v1/assets/{id}"),
        json!({ "changed_by": "alice", "refresh_due_date": due }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Retired assets drop out of the active and department counts.
    let response = common::delete_json(
        &app,
        &format!("/api/v1/assets/{}", spare.id),
        json!({ "changed_by": "alice" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(common::get(&app, "/api/v1/assets/stats").await).await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["active"], 2);
    assert_eq!(body["data"]["unassigned"], 1);
    assert_eq!(body["data"]["due_for_refresh"], 1);
    let departments = body["data"]["department_counts"].as_array().unwrap();
    assert_eq!(departments.len(), 2);
    assert_eq!(departments[0]["department"], "ENG");
    assert_eq!(departments[0]["count"], 1);
    assert_eq!(departments[1]["department"], "FINANCE");
    assert_eq!(departments[1]["count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_retires_instead_of_removing(pool: PgPool) {
    let id = seed(&pool).await;
    let (app, _uploads) = common::build_test_app(pool);

    let response = common::delete_json(
        &app,
        &format!("/api/v1/assets/{id}"),
        json!({ "changed_by": "alice" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["status"], "retired");

    // Still present in the catalog.
    let response = common::get(&app, &format!("/api/v1/assets/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let history =
        common::body_json(common::get(&app, &format!("/api/v1/assets/{id}/history")).await).await;
    assert_eq!(history["data"][0]["change_type"], "status_change");
}
