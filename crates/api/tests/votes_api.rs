//! Integration tests for votes, the spotlight, lookups, and geocoding.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tba_db::MemoryStore;

use common::*;

fn vote_uri(marker: &str) -> String {
    format!("/api/v1/markers/{marker}/vote")
}

// ---------------------------------------------------------------------------
// Test: the three vote states
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vote_state_reflects_stored_row() {
    let app = build_test_app(seeded_store());
    let alice = token_for(ALICE);

    let none = body_json(get_auth(app.clone(), &vote_uri(PIZZA_PLACE), &token_for(BOB)).await).await;
    assert_eq!(none["data"], json!({"state": "no_row"}));

    let active = body_json(get_auth(app.clone(), &vote_uri(PIZZA_PLACE), &alice).await).await;
    assert_eq!(active["data"], json!({"state": "active", "value": 9}));

    let inactive = body_json(get_auth(app, &vote_uri(SECOND_PLACE), &alice).await).await;
    assert_eq!(inactive["data"], json!({"state": "inactive", "retained": 6}));
}

#[tokio::test]
async fn vote_requires_login() {
    let app = build_test_app(seeded_store());

    let response = get(app, &vote_uri(PIZZA_PLACE)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: saving
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_vote_upserts_one_row_per_user() {
    let store = seeded_store();
    let app = build_test_app(store.clone());
    let alice = token_for(ALICE);

    let response = send_json(app.clone(), Method::PUT, &vote_uri(PIZZA_PLACE), Some(&alice), json!({"vote": 8})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["vote"], 8);
    assert_eq!(json["data"]["is_active"], true);

    let state = body_json(get_auth(app, &vote_uri(PIZZA_PLACE), &alice).await).await;
    assert_eq!(state["data"]["value"], 8);
    assert_eq!(store.row_count("votes").await, 2);
}

#[tokio::test]
async fn saving_over_a_cleared_vote_reactivates_it() {
    let app = build_test_app(seeded_store());
    let alice = token_for(ALICE);

    send_json(app.clone(), Method::PUT, &vote_uri(SECOND_PLACE), Some(&alice), json!({"vote": 3})).await;

    let state = body_json(get_auth(app, &vote_uri(SECOND_PLACE), &alice).await).await;
    assert_eq!(state["data"], json!({"state": "active", "value": 3}));
}

#[tokio::test]
async fn out_of_range_vote_is_rejected() {
    let app = build_test_app(seeded_store());

    let response = send_json(
        app,
        Method::PUT,
        &vote_uri(PIZZA_PLACE),
        Some(&token_for(BOB)),
        json!({"vote": 11}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn vote_on_unknown_marker_is_404() {
    let app = build_test_app(seeded_store());

    let response = send_json(
        app,
        Method::PUT,
        &vote_uri("99999999-9999-4999-8999-999999999999"),
        Some(&token_for(BOB)),
        json!({"vote": 5}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: clearing and reactivating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clear_keeps_the_value_for_reactivation() {
    let app = build_test_app(seeded_store());
    let alice = token_for(ALICE);

    let cleared = body_json(send_auth(app.clone(), Method::DELETE, &vote_uri(PIZZA_PLACE), &alice).await).await;
    assert_eq!(cleared["data"], json!({"state": "inactive", "retained": 9}));

    let response = send_auth(app, Method::POST, &format!("{}/reactivate", vote_uri(PIZZA_PLACE)), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["vote"], 9);
    assert_eq!(json["data"]["is_active"], true);
}

#[tokio::test]
async fn clear_without_a_vote_is_a_no_op() {
    let app = build_test_app(seeded_store());

    let cleared = body_json(send_auth(app, Method::DELETE, &vote_uri(PIZZA_PLACE), &token_for(BOB)).await).await;

    assert_eq!(cleared["data"], json!({"state": "no_row"}));
}

#[tokio::test]
async fn reactivate_restores_retained_value() {
    let app = build_test_app(seeded_store());

    let response = send_auth(
        app,
        Method::POST,
        &format!("{}/reactivate", vote_uri(SECOND_PLACE)),
        &token_for(ALICE),
    )
    .await;
    let json = body_json(response).await;

    assert_eq!(json["data"]["vote"], 6);
}

#[tokio::test]
async fn reactivate_without_history_is_conflict() {
    let app = build_test_app(seeded_store());

    let response = send_auth(
        app,
        Method::POST,
        &format!("{}/reactivate", vote_uri(SECOND_PLACE)),
        &token_for(BOB),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;

    assert_eq!(json["error"], "There is no earlier vote to bring back.");
}

#[tokio::test]
async fn votes_on_inactive_marker_are_conflicts() {
    let store = seeded_store();
    let app = build_test_app(store.clone());
    let bob = token_for(BOB);

    let saved = send_json(app.clone(), Method::PUT, &vote_uri(CLOSED_PLACE), Some(&bob), json!({"vote": 3})).await;
    assert_eq!(saved.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(saved).await["error"], "This marker is inactive.");

    let cleared = send_auth(app.clone(), Method::DELETE, &vote_uri(CLOSED_PLACE), &bob).await;
    assert_eq!(cleared.status(), StatusCode::CONFLICT);

    let restored = send_auth(app, Method::POST, &format!("{}/reactivate", vote_uri(CLOSED_PLACE)), &bob).await;
    assert_eq!(restored.status(), StatusCode::CONFLICT);

    assert_eq!(store.row_count("votes").await, 2);
}

// ---------------------------------------------------------------------------
// Test: my votes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn my_votes_lists_active_votes_only() {
    let app = build_test_app(seeded_store());

    let json = body_json(get_auth(app, "/api/v1/votes/mine", &token_for(ALICE)).await).await;
    let votes = json["data"].as_array().unwrap();

    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["marker_id"], PIZZA_PLACE);
    assert_eq!(votes[0]["title"], "Da Michele");
    assert_eq!(votes[0]["category_name"], "Pizza");
    assert_eq!(votes[0]["vote"], 9);
    assert_eq!(votes[0]["marker_active"], true);
}

#[tokio::test]
async fn my_votes_orders_highest_first() {
    let app = build_test_app(seeded_store());
    let bob = token_for(BOB);

    send_json(app.clone(), Method::PUT, &vote_uri(SECOND_PLACE), Some(&bob), json!({"vote": 4})).await;
    send_json(app.clone(), Method::PUT, &vote_uri(CHOCOLATE), Some(&bob), json!({"vote": 10})).await;

    let json = body_json(get_auth(app, "/api/v1/votes/mine", &bob).await).await;
    let values: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["vote"].as_i64().unwrap())
        .collect();

    assert_eq!(values, [10, 4]);
}

// ---------------------------------------------------------------------------
// Test: spotlight
// ---------------------------------------------------------------------------

#[tokio::test]
async fn spotlight_picks_an_active_marker() {
    let app = build_test_app(seeded_store());

    let json = body_json(get(app, "/api/v1/spotlight").await).await;

    let id = json["data"]["marker"]["id"].as_str().unwrap();
    assert!([PIZZA_PLACE, SECOND_PLACE, CHOCOLATE].contains(&id));
    assert!(json["data"]["quip"].is_string());
}

#[tokio::test]
async fn spotlight_is_null_without_markers() {
    let app = build_test_app(Arc::new(MemoryStore::catalog()));

    let response = get(app, "/api/v1/spotlight?last=not-an-id").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert!(json["data"].is_null());
}

// ---------------------------------------------------------------------------
// Test: categories and brands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn categories_are_scoped_and_active_only() {
    let app = build_test_app(seeded_store());

    let places = body_json(get(app.clone(), "/api/v1/categories?scope=places").await).await;
    assert_eq!(places["data"].as_array().unwrap().len(), 1);
    assert_eq!(places["data"][0]["name"], "Pizza");

    let all = body_json(get(app, "/api/v1/categories").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn brands_are_active_only() {
    let app = build_test_app(seeded_store());

    let json = body_json(get(app, "/api/v1/brands").await).await;
    let brands = json["data"].as_array().unwrap();

    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0]["name"], "Lindt");
}

// ---------------------------------------------------------------------------
// Test: reverse geocoding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn geocode_failure_still_answers_200() {
    let app = build_test_app(seeded_store());

    let response = get_auth(app, "/api/v1/geocode/reverse?lat=41.38&lon=2.16", &token_for(BOB)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["address"], "");
    assert_eq!(
        json["data"]["message"],
        "Address lookup failed (you can type it manually)."
    );
}

#[tokio::test]
async fn geocode_rejects_out_of_range_points() {
    let app = build_test_app(seeded_store());

    let response = get_auth(app, "/api/v1/geocode/reverse?lat=200&lon=2.16", &token_for(BOB)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn geocode_requires_login() {
    let app = build_test_app(seeded_store());

    let response = get(app, "/api/v1/geocode/reverse?lat=41.38&lon=2.16").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
