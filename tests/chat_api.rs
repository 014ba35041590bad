//! Chat API integration tests: rooms, messages, read tracking, search.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serial_test::serial;

use common::auth_helpers::{auth_header, create_test_user, TestUser};
use common::database::TestDatabase;
use common::test_server;

async fn open_direct_room(
    server: &axum_test::TestServer,
    user: &TestUser,
    peer: &TestUser,
) -> serde_json::Value {
    let response = server
        .post("/api/chat/rooms")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "room_type": "direct", "user_id": peer.id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
#[serial]
async fn test_direct_room_is_reused() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();
    let bob = create_test_user(db.pool(), "bob", "password123")
        .await
        .unwrap();

    let first = open_direct_room(&server, &alice, &bob).await;
    // Same pair from the other side lands in the same room.
    let second = open_direct_room(&server, &bob, &alice).await;
    assert_eq!(first["id"], second["id"]);

    // Direct rooms display the peer's name.
    assert_eq!(first["name"], "bob");
    assert_eq!(second["name"], "alice");
}

#[tokio::test]
#[serial]
async fn test_cannot_chat_with_yourself() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();

    let response = server
        .post("/api/chat/rooms")
        .add_header("Authorization", auth_header(&alice.token))
        .json(&serde_json::json!({ "room_type": "direct", "user_id": alice.id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_send_and_list_messages() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();
    let bob = create_test_user(db.pool(), "bob", "password123")
        .await
        .unwrap();

    let room = open_direct_room(&server, &alice, &bob).await;
    let room_id = room["id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/chat/rooms/{room_id}/messages"))
        .add_header("Authorization", auth_header(&alice.token))
        .json(&serde_json::json!({ "content": "hello bob" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let messages: Vec<serde_json::Value> = server
        .get(&format!("/api/chat/rooms/{room_id}/messages"))
        .add_header("Authorization", auth_header(&bob.token))
        .await
        .json();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hello bob");
    assert_eq!(messages[0]["sender_username"], "alice");
}

#[tokio::test]
#[serial]
async fn test_empty_message_rejected() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();
    let bob = create_test_user(db.pool(), "bob", "password123")
        .await
        .unwrap();

    let room = open_direct_room(&server, &alice, &bob).await;
    let response = server
        .post(&format!("/api/chat/rooms/{}/messages", room["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&alice.token))
        .json(&serde_json::json!({ "content": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_non_member_cannot_read_room() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();
    let bob = create_test_user(db.pool(), "bob", "password123")
        .await
        .unwrap();
    let eve = create_test_user(db.pool(), "eve", "password123")
        .await
        .unwrap();

    let room = open_direct_room(&server, &alice, &bob).await;
    let response = server
        .get(&format!("/api/chat/rooms/{}/messages", room["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&eve.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_unread_count_and_mark_read() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();
    let bob = create_test_user(db.pool(), "bob", "password123")
        .await
        .unwrap();

    let room = open_direct_room(&server, &alice, &bob).await;
    let room_id = room["id"].as_str().unwrap();

    for content in ["one", "two"] {
        server
            .post(&format!("/api/chat/rooms/{room_id}/messages"))
            .add_header("Authorization", auth_header(&alice.token))
            .json(&serde_json::json!({ "content": content }))
            .await;
    }

    let rooms: Vec<serde_json::Value> = server
        .get("/api/chat/rooms")
        .add_header("Authorization", auth_header(&bob.token))
        .await
        .json();
    assert_eq!(rooms[0]["unread_count"], 2);
    // The sender's own messages are not unread.
    let sender_rooms: Vec<serde_json::Value> = server
        .get("/api/chat/rooms")
        .add_header("Authorization", auth_header(&alice.token))
        .await
        .json();
    assert_eq!(sender_rooms[0]["unread_count"], 0);

    server
        .post(&format!("/api/chat/rooms/{room_id}/read"))
        .add_header("Authorization", auth_header(&bob.token))
        .await;

    let rooms: Vec<serde_json::Value> = server
        .get("/api/chat/rooms")
        .add_header("Authorization", auth_header(&bob.token))
        .await
        .json();
    assert_eq!(rooms[0]["unread_count"], 0);
}

#[tokio::test]
#[serial]
async fn test_favorite_rooms_sort_first() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();
    let bob = create_test_user(db.pool(), "bob", "password123")
        .await
        .unwrap();
    let carol = create_test_user(db.pool(), "carol", "password123")
        .await
        .unwrap();

    let bob_room = open_direct_room(&server, &alice, &bob).await;
    let carol_room = open_direct_room(&server, &alice, &carol).await;

    // Carol's room is newer, but Bob's gets favorited.
    server
        .post(&format!("/api/chat/rooms/{}/favorite", bob_room["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&alice.token))
        .await;

    let rooms: Vec<serde_json::Value> = server
        .get("/api/chat/rooms")
        .add_header("Authorization", auth_header(&alice.token))
        .await
        .json();
    assert_eq!(rooms[0]["id"], bob_room["id"]);
    assert_eq!(rooms[1]["id"], carol_room["id"]);
}

#[tokio::test]
#[serial]
async fn test_group_room_requires_name() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();

    let response = server
        .post("/api/chat/rooms")
        .add_header("Authorization", auth_header(&alice.token))
        .json(&serde_json::json!({ "room_type": "group" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_message_search_scoped_to_own_rooms() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let alice = create_test_user(db.pool(), "alice", "password123")
        .await
        .unwrap();
    let bob = create_test_user(db.pool(), "bob", "password123")
        .await
        .unwrap();
    let eve = create_test_user(db.pool(), "eve", "password123")
        .await
        .unwrap();

    let room = open_direct_room(&server, &alice, &bob).await;
    server
        .post(&format!("/api/chat/rooms/{}/messages", room["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&alice.token))
        .json(&serde_json::json!({ "content": "the launch codes" }))
        .await;

    let found: Vec<serde_json::Value> = server
        .get("/api/chat/search?q=launch")
        .add_header("Authorization", auth_header(&bob.token))
        .await
        .json();
    assert_eq!(found.len(), 1);

    let hidden: Vec<serde_json::Value> = server
        .get("/api/chat/search?q=launch")
        .add_header("Authorization", auth_header(&eve.token))
        .await
        .json();
    assert!(hidden.is_empty());
}
