pub mod health;
pub mod pages;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories?scope=                          active categories (public)
/// /brands                                     active brands (public)
///
/// /markers?type=&category=&min_rating=&rating=  list (public)
/// /markers/{id}                               get (public), update (auth)
/// /markers/{id}/deactivate                    soft delete (POST, auth)
/// /places                                     create place (POST, auth)
/// /products                                   create product (POST, auth)
///
/// /markers/{id}/vote                          get, save (PUT), clear (DELETE)
/// /markers/{id}/vote/reactivate               restore cleared vote (POST)
/// /votes/mine                                 my active votes
///
/// /spotlight?last=                            random marker (public)
/// /geocode/reverse?lat=&lon=                  address lookup (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handlers::categories::list_categories))
        .route("/brands", get(handlers::brands::list_brands))
        .route("/markers", get(handlers::markers::list_markers))
        .route(
            "/markers/{id}",
            get(handlers::markers::get_marker).put(handlers::markers::update_marker),
        )
        .route(
            "/markers/{id}/deactivate",
            post(handlers::markers::deactivate_marker),
        )
        .route("/places", post(handlers::markers::create_place))
        .route("/products", post(handlers::markers::create_product))
        .route(
            "/markers/{id}/vote",
            get(handlers::votes::get_my_vote)
                .put(handlers::votes::save_my_vote)
                .delete(handlers::votes::clear_my_vote),
        )
        .route(
            "/markers/{id}/vote/reactivate",
            post(handlers::votes::reactivate_my_vote),
        )
        .route("/votes/mine", get(handlers::votes::list_my_votes))
        .route("/spotlight", get(handlers::spotlight::pick_spotlight))
        .route("/geocode/reverse", get(handlers::geocode::reverse_geocode))
}
