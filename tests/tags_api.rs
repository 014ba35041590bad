//! Tags API integration tests: CRUD, usage counting, cloud, autocomplete.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serial_test::serial;

use common::auth_helpers::{auth_header, create_test_user};
use common::database::TestDatabase;
use common::test_server;

#[tokio::test]
#[serial]
async fn test_create_tag_and_reject_duplicate() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "tagger", "password123")
        .await
        .unwrap();

    let response = server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "rust" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let duplicate = server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "rust" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_usage_count_follows_note_tagging() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "tagger", "password123")
        .await
        .unwrap();

    let tag: serde_json::Value = server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "rust" }))
        .await
        .json();

    let note: serde_json::Value = server
        .post("/api/notes")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "title": "Note", "content": "x", "tags": [tag["id"]] }))
        .await
        .json();

    let tags: Vec<serde_json::Value> = server
        .get("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(tags[0]["usage_count"], 1);

    // Removing the tag from the note drops the count back to zero.
    server
        .put(&format!("/api/notes/{}", note["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "tags": [] }))
        .await;

    let tags: Vec<serde_json::Value> = server
        .get("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(tags[0]["usage_count"], 0);
}

#[tokio::test]
#[serial]
async fn test_tag_cloud_sizes() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "tagger", "password123")
        .await
        .unwrap();

    let busy: serde_json::Value = server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "busy" }))
        .await
        .json();
    server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "idle" }))
        .await;

    server
        .post("/api/notes")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "title": "N", "content": "x", "tags": [busy["id"]] }))
        .await;

    let cloud: Vec<serde_json::Value> = server
        .get("/api/tags/cloud")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();

    let busy_entry = cloud.iter().find(|t| t["name"] == "busy").unwrap();
    let idle_entry = cloud.iter().find(|t| t["name"] == "idle").unwrap();
    assert_eq!(busy_entry["size"], 100);
    assert_eq!(idle_entry["size"], 12);
}

#[tokio::test]
#[serial]
async fn test_autocomplete_prefix_match() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "tagger", "password123")
        .await
        .unwrap();

    for name in ["rust", "rustlings", "python"] {
        server
            .post("/api/tags")
            .add_header("Authorization", auth_header(&user.token))
            .json(&serde_json::json!({ "name": name }))
            .await;
    }

    let matches: Vec<serde_json::Value> = server
        .get("/api/tags/autocomplete?q=rus")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(matches.len(), 2);

    let empty: Vec<serde_json::Value> = server
        .get("/api/tags/autocomplete?q=")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert!(empty.is_empty());
}

#[tokio::test]
#[serial]
async fn test_list_tags_search_filter() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "tagger", "password123")
        .await
        .unwrap();

    for name in ["work-notes", "homework", "recipes"] {
        server
            .post("/api/tags")
            .add_header("Authorization", auth_header(&user.token))
            .json(&serde_json::json!({ "name": name }))
            .await;
    }

    let matches: Vec<serde_json::Value> = server
        .get("/api/tags?search=work")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(matches.len(), 2);
}

#[tokio::test]
#[serial]
async fn test_tag_statistics() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "tagger", "password123")
        .await
        .unwrap();

    let used: serde_json::Value = server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "used" }))
        .await
        .json();
    server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "unused" }))
        .await;

    server
        .post("/api/notes")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "title": "N", "content": "x", "tags": [used["id"]] }))
        .await;

    let stats: serde_json::Value = server
        .get("/api/tags/statistics")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(stats["total_tags"], 2);
    assert_eq!(stats["total_usages"], 1);
    assert_eq!(stats["unused_tags"], 1);
    assert_eq!(stats["most_used"]["name"], "used");
}

#[tokio::test]
#[serial]
async fn test_deleting_tag_detaches_it_from_notes() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "tagger", "password123")
        .await
        .unwrap();

    let tag: serde_json::Value = server
        .post("/api/tags")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "name": "gone" }))
        .await
        .json();
    let note: serde_json::Value = server
        .post("/api/notes")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "title": "N", "content": "x", "tags": [tag["id"]] }))
        .await
        .json();

    let response = server
        .delete(&format!("/api/tags/{}", tag["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&user.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let fetched: serde_json::Value = server
        .get(&format!("/api/notes/{}", note["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert!(fetched["tags"].as_array().unwrap().is_empty());
}
