//! Notes API integration tests: CRUD, pin/archive, rewards, encryption.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serial_test::serial;

use common::auth_helpers::{auth_header, create_test_user, TestUser};
use common::database::TestDatabase;
use common::test_server;

async fn create_note(
    server: &axum_test::TestServer,
    user: &TestUser,
    title: &str,
    content: &str,
) -> serde_json::Value {
    let response = server
        .post("/api/notes")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "title": title, "content": content }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
#[serial]
async fn test_create_and_get_note() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &user, "Groceries", "milk, eggs").await;
    assert_eq!(note["title"], "Groceries");
    assert_eq!(note["content"], "milk, eggs");
    assert_eq!(note["is_encrypted"], false);

    let response = server
        .get(&format!("/api/notes/{}", note["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&user.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_create_note_awards_coins() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    create_note(&server, &user, "First", "one").await;
    create_note(&server, &user, "Second", "two").await;

    let response = server
        .get("/api/currency")
        .add_header("Authorization", auth_header(&user.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let wallet: serde_json::Value = response.json();
    assert_eq!(wallet["balance"], 20);
    assert_eq!(wallet["total_earned"], 20);
}

#[tokio::test]
#[serial]
async fn test_note_isolation_between_users() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let owner = create_test_user(db.pool(), "owner", "password123")
        .await
        .unwrap();
    let other = create_test_user(db.pool(), "other", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &owner, "Private", "mine").await;

    let response = server
        .get(&format!("/api/notes/{}", note["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&other.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_archived_notes_leave_default_list() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &user, "Old", "done").await;
    let note_id = note["id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/notes/{note_id}/archive"))
        .add_header("Authorization", auth_header(&user.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let active: Vec<serde_json::Value> = server
        .get("/api/notes")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert!(active.is_empty());

    let archived: Vec<serde_json::Value> = server
        .get("/api/notes?archived=true")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(archived.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_pinned_notes_sort_first() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let first = create_note(&server, &user, "First", "a").await;
    let _second = create_note(&server, &user, "Second", "b").await;

    server
        .post(&format!("/api/notes/{}/pin", first["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&user.token))
        .await;

    let notes: Vec<serde_json::Value> = server
        .get("/api/notes")
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(notes[0]["title"], "First");
    assert_eq!(notes[0]["is_pinned"], true);
}

#[tokio::test]
#[serial]
async fn test_encrypt_masks_content() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &user, "Secret", "the plan").await;
    let note_id = note["id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/notes/{note_id}/encrypt"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "password": "vault" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let sealed: serde_json::Value = response.json();
    assert_eq!(sealed["is_encrypted"], true);
    assert_eq!(sealed["content"], "");

    // Reads keep the content masked.
    let fetched: serde_json::Value = server
        .get(&format!("/api/notes/{note_id}"))
        .add_header("Authorization", auth_header(&user.token))
        .await
        .json();
    assert_eq!(fetched["content"], "");
}

#[tokio::test]
#[serial]
async fn test_decrypt_requires_correct_password() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &user, "Secret", "the plan").await;
    let note_id = note["id"].as_str().unwrap();

    server
        .post(&format!("/api/notes/{note_id}/encrypt"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "password": "vault" }))
        .await;

    let wrong = server
        .post(&format!("/api/notes/{note_id}/decrypt"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "password": "nope" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let right = server
        .post(&format!("/api/notes/{note_id}/decrypt"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "password": "vault" }))
        .await;
    assert_eq!(right.status_code(), StatusCode::OK);
    let body: serde_json::Value = right.json();
    assert_eq!(body["content"], "the plan");
}

#[tokio::test]
#[serial]
async fn test_remove_encryption_restores_plaintext() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &user, "Secret", "the plan").await;
    let note_id = note["id"].as_str().unwrap();

    server
        .post(&format!("/api/notes/{note_id}/encrypt"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "password": "vault" }))
        .await;

    let response = server
        .delete(&format!("/api/notes/{note_id}/encryption"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "password": "vault" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_encrypted"], false);
    assert_eq!(body["content"], "the plan");
}

#[tokio::test]
#[serial]
async fn test_cannot_edit_encrypted_content() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &user, "Secret", "the plan").await;
    let note_id = note["id"].as_str().unwrap();

    server
        .post(&format!("/api/notes/{note_id}/encrypt"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "password": "vault" }))
        .await;

    let response = server
        .put(&format!("/api/notes/{note_id}"))
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "content": "overwrite attempt" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_delete_note() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let user = create_test_user(db.pool(), "writer", "password123")
        .await
        .unwrap();

    let note = create_note(&server, &user, "Trash", "gone soon").await;
    let note_id = note["id"].as_str().unwrap();

    let response = server
        .delete(&format!("/api/notes/{note_id}"))
        .add_header("Authorization", auth_header(&user.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let gone = server
        .get(&format!("/api/notes/{note_id}"))
        .add_header("Authorization", auth_header(&user.token))
        .await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
}
