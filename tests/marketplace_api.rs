//! Marketplace API integration tests: listing, purchasing, payouts.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serial_test::serial;

use common::auth_helpers::{auth_header, create_test_user, TestUser};
use common::database::TestDatabase;
use common::test_server;

async fn earn_coins(server: &axum_test::TestServer, user: &TestUser, amount: i32) {
    let response = server
        .post("/api/currency/earn")
        .add_header("Authorization", auth_header(&user.token))
        .json(&serde_json::json!({ "amount": amount, "description": "Test funding" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

async fn list_template_item(
    server: &axum_test::TestServer,
    seller: &TestUser,
    name: &str,
    price: i32,
) -> serde_json::Value {
    let response = server
        .post("/api/marketplace")
        .add_header("Authorization", auth_header(&seller.token))
        .json(&serde_json::json!({
            "name": name,
            "item_type": "template",
            "price": price,
            "description": "A reusable outline",
            "content": "# Agenda\n\n- "
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
#[serial]
async fn test_template_item_requires_content() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();

    let response = server
        .post("/api/marketplace")
        .add_header("Authorization", auth_header(&seller.token))
        .json(&serde_json::json!({
            "name": "Empty template",
            "item_type": "template",
            "price": 10
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_unknown_item_type_rejected() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();

    let response = server
        .post("/api/marketplace")
        .add_header("Authorization", auth_header(&seller.token))
        .json(&serde_json::json!({
            "name": "Mystery box",
            "item_type": "loot",
            "price": 10
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_purchase_moves_coins_to_creator() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();
    let buyer = create_test_user(db.pool(), "buyer", "password123")
        .await
        .unwrap();

    let item = list_template_item(&server, &seller, "Standup notes", 40).await;
    let item_id = item["id"].as_str().unwrap();
    earn_coins(&server, &buyer, 50).await;

    let response = server
        .post(&format!("/api/marketplace/{item_id}/purchase"))
        .add_header("Authorization", auth_header(&buyer.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["purchase"]["price_paid"], 40);
    assert_eq!(body["balance"], 10);

    let seller_wallet: serde_json::Value = server
        .get("/api/currency")
        .add_header("Authorization", auth_header(&seller.token))
        .await
        .json();
    assert_eq!(seller_wallet["balance"], 40);

    let purchases: Vec<serde_json::Value> = server
        .get("/api/marketplace/purchases")
        .add_header("Authorization", auth_header(&buyer.token))
        .await
        .json();
    assert_eq!(purchases.len(), 1);

    let listed: serde_json::Value = server
        .get(&format!("/api/marketplace/{item_id}"))
        .add_header("Authorization", auth_header(&buyer.token))
        .await
        .json();
    assert_eq!(listed["owned"], true);
    assert_eq!(listed["purchases_count"], 1);
}

#[tokio::test]
#[serial]
async fn test_purchase_fails_on_insufficient_funds() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();
    let buyer = create_test_user(db.pool(), "buyer", "password123")
        .await
        .unwrap();

    let item = list_template_item(&server, &seller, "Pricey", 90).await;
    earn_coins(&server, &buyer, 10).await;

    let response = server
        .post(&format!("/api/marketplace/{}/purchase", item["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&buyer.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Nothing was charged.
    let wallet: serde_json::Value = server
        .get("/api/currency")
        .add_header("Authorization", auth_header(&buyer.token))
        .await
        .json();
    assert_eq!(wallet["balance"], 10);
}

#[tokio::test]
#[serial]
async fn test_double_purchase_rejected() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();
    let buyer = create_test_user(db.pool(), "buyer", "password123")
        .await
        .unwrap();

    let item = list_template_item(&server, &seller, "Once only", 20).await;
    let item_id = item["id"].as_str().unwrap();
    earn_coins(&server, &buyer, 100).await;

    server
        .post(&format!("/api/marketplace/{item_id}/purchase"))
        .add_header("Authorization", auth_header(&buyer.token))
        .await;
    let repeat = server
        .post(&format!("/api/marketplace/{item_id}/purchase"))
        .add_header("Authorization", auth_header(&buyer.token))
        .await;
    assert_eq!(repeat.status_code(), StatusCode::BAD_REQUEST);

    let wallet: serde_json::Value = server
        .get("/api/currency")
        .add_header("Authorization", auth_header(&buyer.token))
        .await
        .json();
    assert_eq!(wallet["balance"], 80);
}

#[tokio::test]
#[serial]
async fn test_cannot_purchase_own_item() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();

    let item = list_template_item(&server, &seller, "Mine", 5).await;
    earn_coins(&server, &seller, 50).await;

    let response = server
        .post(&format!("/api/marketplace/{}/purchase", item["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&seller.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_free_item_needs_no_balance() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();
    let buyer = create_test_user(db.pool(), "buyer", "password123")
        .await
        .unwrap();

    let item = list_template_item(&server, &seller, "Freebie", 0).await;

    let response = server
        .post(&format!("/api/marketplace/{}/purchase", item["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&buyer.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["purchase"]["price_paid"], 0);
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
#[serial]
async fn test_purchase_unlocks_premium_template() {
    let db = TestDatabase::new().await;
    let server = test_server(&db);
    let seller = create_test_user(db.pool(), "seller", "password123")
        .await
        .unwrap();
    let buyer = create_test_user(db.pool(), "buyer", "password123")
        .await
        .unwrap();

    let item = list_template_item(&server, &seller, "Meeting outline", 30).await;
    let template_id = item["template_id"].as_str().unwrap().to_string();

    // Locked until purchased.
    let locked = server
        .post("/api/notes/from-template")
        .add_header("Authorization", auth_header(&buyer.token))
        .json(&serde_json::json!({ "template_id": template_id, "title": "Monday" }))
        .await;
    assert_eq!(locked.status_code(), StatusCode::FORBIDDEN);

    earn_coins(&server, &buyer, 50).await;
    server
        .post(&format!("/api/marketplace/{}/purchase", item["id"].as_str().unwrap()))
        .add_header("Authorization", auth_header(&buyer.token))
        .await;

    let unlocked = server
        .post("/api/notes/from-template")
        .add_header("Authorization", auth_header(&buyer.token))
        .json(&serde_json::json!({ "template_id": template_id, "title": "Monday" }))
        .await;
    assert_eq!(unlocked.status_code(), StatusCode::OK);
    let note: serde_json::Value = unlocked.json();
    assert_eq!(note["title"], "Monday");
}
