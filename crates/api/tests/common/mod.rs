#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tba_api::auth::jwt::generate_access_token;
use tba_api::config::ServerConfig;
use tba_api::geocode::Geocoder;
use tba_api::middleware::auth::ACCESS_TOKEN_COOKIE;
use tba_api::router::build_app_router;
use tba_api::state::AppState;
use tba_db::MemoryStore;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";

pub const PIZZA_PLACE: &str = "11111111-1111-4111-8111-111111111111";
pub const SECOND_PLACE: &str = "22222222-2222-4222-8222-222222222222";
pub const CHOCOLATE: &str = "33333333-3333-4333-8333-333333333333";
pub const CLOSED_PLACE: &str = "44444444-4444-4444-8444-444444444444";

pub const ALICE: &str = "aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa";
pub const BOB: &str = "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb";

/// Build a test `ServerConfig` backed by the in-memory store.
///
/// Geocoding points at a closed local port so lookups fail fast.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_vars(|key| {
        let value = match key {
            "STORE_BACKEND" => "memory",
            "SUPABASE_JWT_SECRET" => JWT_SECRET,
            "PUBLIC_BASE_URL" => "https://cdn.example.org/tba/",
            "LOGIN_URL" => "https://cdn.example.org/tba/login.html",
            "GEOCODE_BASE_URL" => "http://127.0.0.1:9/reverse",
            "GEOCODE_TIMEOUT_SECS" => "2",
            _ => return None,
        };
        Some(value.to_string())
    })
}

/// A small catalog: two places and a product, plus an inactive place.
pub fn seed() -> Value {
    json!({
        "categories": [
            { "id": 1, "name": "Pizza", "icon_url": "icons/pizza.svg", "is_active": true, "for_places": true, "for_products": false },
            { "id": 2, "name": "Chocolate", "icon_url": null, "is_active": true, "for_places": false, "for_products": true },
            { "id": 3, "name": "Retired", "is_active": false, "for_places": true, "for_products": true }
        ],
        "brands": [
            { "id": 10, "name": "Lindt", "is_active": true },
            { "id": 11, "name": "Old Brand", "is_active": false }
        ],
        "markers": [
            {
                "id": PIZZA_PLACE, "title": "Da Michele", "group_type": "place", "category_id": 1,
                "brand_id": null, "rating_avg": 9.5, "rating_count": 2,
                "address": "Via Cesare Sersale 1, Napoli", "lat": 40.8497, "lon": 14.2633,
                "is_active": true, "created_at": "2024-03-01T10:00:00Z"
            },
            {
                "id": SECOND_PLACE, "title": "Sorbillo", "group_type": "place", "category_id": 1,
                "brand_id": null, "rating_avg": 7.5, "rating_count": 1,
                "address": null, "lat": 40.8503, "lon": 14.2556,
                "is_active": true, "created_at": "2024-03-02T10:00:00Z"
            },
            {
                "id": CHOCOLATE, "title": "Excellence 70%", "group_type": "product", "category_id": 2,
                "brand_id": 10, "rating_avg": 8.0, "rating_count": 1,
                "is_active": true, "created_at": "2024-02-01T10:00:00Z"
            },
            {
                "id": CLOSED_PLACE, "title": "Gone Pizzeria", "group_type": "place", "category_id": 1,
                "rating_avg": null, "rating_count": 0, "lat": 40.0, "lon": 14.0,
                "is_active": false, "created_at": "2024-01-01T10:00:00Z"
            }
        ],
        "votes": [
            { "marker_id": PIZZA_PLACE, "user_id": ALICE, "vote": 9, "is_active": true, "updated_at": "2024-03-01T11:00:00Z" },
            { "marker_id": SECOND_PLACE, "user_id": ALICE, "vote": 6, "is_active": false, "updated_at": "2024-03-02T11:00:00Z" }
        ]
    })
}

pub fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::catalog()
            .seeded(seed())
            .expect("seed is a JSON object"),
    )
}

/// Build the full application router around `store`, using the same
/// middleware stack as production.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let config = test_config();
    let geocoder = Geocoder::new(&config.geocode).expect("geocoder builds");
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        geocoder: Arc::new(geocoder),
    };
    build_app_router(state, &config)
}

/// A valid access token for `user_id`.
pub fn token_for(user_id: &str) -> String {
    let config = test_config();
    let user_id = Uuid::parse_str(user_id).expect("valid uuid");
    generate_access_token(user_id, Some("alice@example.org"), &config.jwt, 3600)
        .expect("token encodes")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET with the access token in the page cookie.
pub async fn get_with_cookie(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, format!("{ACCESS_TOKEN_COOKIE}={token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn send_auth(app: Router, method: Method, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST an url-encoded form, optionally signed in through the cookie.
pub async fn post_form(app: Router, uri: &str, token: Option<&str>, form: &str) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("{ACCESS_TOKEN_COOKIE}={token}"));
    }
    send(app, builder.body(Body::from(form.to_string())).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
