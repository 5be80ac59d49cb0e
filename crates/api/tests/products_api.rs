//! Integration tests for product creation and product edits.
//!
//! Products are identified by their (category, brand) pair.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tba_db::MemoryStore;

use common::*;

fn store_with_extra_brand() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::catalog()
            .seeded(seed())
            .unwrap()
            .with_rows("brands", vec![json!({"id": 12, "name": "Valrhona", "is_active": true})]),
    )
}

fn new_product(brand_id: &str) -> Value {
    json!({
        "title": "Guanaja 70%",
        "category_id": "2",
        "brand_id": brand_id,
        "vote": 9
    })
}

// ---------------------------------------------------------------------------
// Test: an existing (category, brand) pair points at the existing product
// ---------------------------------------------------------------------------

#[tokio::test]
async fn existing_pair_returns_existing_product() {
    let store = seeded_store();
    let app = build_test_app(store.clone());

    let response = send_json(
        app,
        Method::POST,
        "/api/v1/products",
        Some(&token_for(BOB)),
        new_product("10"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"], json!({"id": CHOCOLATE, "existing": true}));
    assert_eq!(store.row_count("markers").await, 4);
    assert_eq!(store.row_count("votes").await, 2, "no vote is cast on the existing product");
}

// ---------------------------------------------------------------------------
// Test: a new pair creates the product and the creator's vote
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_pair_creates_product() {
    let store = store_with_extra_brand();
    let app = build_test_app(store.clone());

    let response = send_json(
        app,
        Method::POST,
        "/api/v1/products",
        Some(&token_for(BOB)),
        new_product("12"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    let marker = &json["data"]["marker"];
    assert_eq!(marker["group_type"], "product");
    assert_eq!(marker["brand_id"], "12");
    assert!(marker["lat"].is_null());
    assert!(json["data"]["vote_error"].is_null());
    assert_eq!(store.row_count("votes").await, 3);
}

// ---------------------------------------------------------------------------
// Test: validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inactive_brand_is_rejected() {
    let app = build_test_app(seeded_store());

    let response = send_json(
        app,
        Method::POST,
        "/api/v1/products",
        Some(&token_for(BOB)),
        new_product("11"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;

    assert_eq!(json["error"], "Brand is required.");
}

#[tokio::test]
async fn place_category_is_rejected_for_products() {
    let app = build_test_app(seeded_store());
    let mut body = new_product("10");
    body["category_id"] = json!("1");

    let response = send_json(app, Method::POST, "/api/v1/products", Some(&token_for(BOB)), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;

    assert_eq!(json["error"], "Pick a product category.");
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = build_test_app(store_with_extra_brand());
    let mut body = new_product("12");
    body["title"] = json!("   ");

    let response = send_json(app, Method::POST, "/api/v1/products", Some(&token_for(BOB)), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;

    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: editing products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_edit_drops_location_fields() {
    let app = build_test_app(seeded_store());
    let body = json!({
        "title": "Excellence 85%",
        "category_id": "2",
        "brand_id": "10",
        "address": "Somewhere",
        "lat": 41.0,
        "lon": 2.0
    });

    let response = send_json(
        app,
        Method::PUT,
        &format!("/api/v1/markers/{CHOCOLATE}"),
        Some(&token_for(ALICE)),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["title"], "Excellence 85%");
    assert!(json["data"]["address"].is_null());
    assert!(json["data"]["lat"].is_null());
    assert!(json["data"]["lon"].is_null());
}

#[tokio::test]
async fn product_edit_requires_brand() {
    let app = build_test_app(seeded_store());
    let body = json!({ "title": "Excellence 85%", "category_id": "2", "brand_id": null });

    let response = send_json(
        app,
        Method::PUT,
        &format!("/api/v1/markers/{CHOCOLATE}"),
        Some(&token_for(ALICE)),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;

    assert_eq!(json["error"], "Brand is required.");
}

#[tokio::test]
async fn product_edit_rejects_place_category() {
    let app = build_test_app(seeded_store());
    let body = json!({ "title": "Excellence 70%", "category_id": "1", "brand_id": "10" });

    let response = send_json(
        app,
        Method::PUT,
        &format!("/api/v1/markers/{CHOCOLATE}"),
        Some(&token_for(ALICE)),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;

    assert_eq!(json["error"], "Pick a product category.");
}

#[tokio::test]
async fn product_edit_rejects_inactive_or_unknown_brand() {
    let app = build_test_app(seeded_store());

    for brand_id in ["11", "999"] {
        let body = json!({ "title": "Excellence 70%", "category_id": "2", "brand_id": brand_id });
        let response = send_json(
            app.clone(),
            Method::PUT,
            &format!("/api/v1/markers/{CHOCOLATE}"),
            Some(&token_for(ALICE)),
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "brand {brand_id}");
        let json = body_json(response).await;

        assert_eq!(json["error"], "Brand is required.");
    }

    let detail = body_json(get(app, &format!("/api/v1/markers/{CHOCOLATE}")).await).await;
    assert_eq!(detail["data"]["brand_id"], "10");
}
