//! Template catalog integration tests.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serial_test::serial;
use uuid::Uuid;

use common::auth_helpers::{auth_header, create_test_user};
use common::database::TestDatabase;
use common::test_server;

async fn seed_template(pool: &sqlx::PgPool, name: &str, category: &str, default: bool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO note_templates (id, name, category, content, is_default, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW())",
    )
    .bind(id)
    .bind(name)
    .bind(category)
    .bind("## Outline\n\n- ")
    .bind(default)
    .execute(pool)
    .await
    .unwrap();
    id
}

#[tokio::test]
#[serial]
async fn test_list_templates_defaults_first() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "reader", "password123")
        .await
        .unwrap();

    seed_template(db.pool(), "Blank", "basic", false).await;
    seed_template(db.pool(), "Daily journal", "journal", true).await;

    let templates: Vec<serde_json::Value> = server
        .get("/api/templates")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0]["name"], "Daily journal");
}

#[tokio::test]
#[serial]
async fn test_list_templates_filtered_by_category() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "reader", "password123")
        .await
        .unwrap();

    seed_template(db.pool(), "Blank", "basic", false).await;
    seed_template(db.pool(), "Daily journal", "journal", true).await;

    let templates: Vec<serde_json::Value> = server
        .get("/api/templates?category=journal")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["name"], "Daily journal");

    let categories: Vec<String> = server
        .get("/api/templates/categories")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(categories, vec!["basic", "journal"]);
}

#[tokio::test]
#[serial]
async fn test_get_template_and_instantiate_note() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "reader", "password123")
        .await
        .unwrap();

    let template_id = seed_template(db.pool(), "Daily journal", "journal", true).await;

    let template: serde_json::Value = server
        .get(&format!("/api/templates/{template_id}"))
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(template["name"], "Daily journal");
    assert_eq!(template["is_premium"], false);

    let note: serde_json::Value = server
        .post("/api/notes/from-template")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "template_id": template_id }))
        .await
        .json();
    assert_eq!(note["content"], "## Outline\n\n- ");
    assert_eq!(note["template_id"], template_id.to_string());

    let missing = server
        .get(&format!("/api/templates/{}", Uuid::new_v4()))
        .add_header("Authorization", auth_header(&user.token))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}
