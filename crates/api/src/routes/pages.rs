use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// Server-rendered pages and their form targets.
///
/// ```text
/// /                                   home (GET)
/// /list                               all markers (GET)
/// /map                                places map (GET)
/// /map/places                         add place (POST)
/// /products                           products (GET), add product (POST)
/// /marker/{id}                        marker detail (GET)
/// /marker/{id}/vote                   save vote (POST)
/// /marker/{id}/vote/clear             clear vote (POST)
/// /marker/{id}/vote/reactivate        restore cleared vote (POST)
/// /marker/{id}/edit                   edit fields (POST)
/// /marker/{id}/deactivate             soft delete (POST)
/// /votes                              my votes (GET)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/list", get(pages::list_page))
        .route("/map", get(pages::map_page))
        .route("/map/places", post(pages::submit_place))
        .route(
            "/products",
            get(pages::products_page).post(pages::submit_product),
        )
        .route("/marker/{id}", get(pages::marker_page))
        .route("/marker/{id}/vote", post(pages::submit_vote))
        .route("/marker/{id}/vote/clear", post(pages::submit_clear_vote))
        .route(
            "/marker/{id}/vote/reactivate",
            post(pages::submit_reactivate_vote),
        )
        .route("/marker/{id}/edit", post(pages::submit_edit))
        .route("/marker/{id}/deactivate", post(pages::submit_deactivate))
        .route("/votes", get(pages::votes_page))
}
