//! HTML page handlers and their form posts.
//!
//! Pages are public and read as the shared store; the header reflects the
//! optional [`MaybeUser`]. Form posts write as the signed-in user, redirect
//! (303) on success, and re-render the page with the failure in its status
//! line otherwise.

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tba_core::error::CoreError;
use tba_core::listing::{
    sort_by_rating_desc, sort_by_rating_then_title, sort_recent, CategoryScope, ListFilter,
    ListParams, MapFilter, MapParams, CRAVING_CHIP_LIMIT, MAP_QUICK_CHIP_LIMIT, RECENT_LIMIT,
};
use tba_core::marker::GroupType;
use tba_core::types::MarkerId;
use tba_db::lookup::LookupTables;
use tba_db::models::category::Category;
use tba_db::models::marker::{Marker, UpdateMarker};
use tba_db::repositories::{MarkerQuery, MarkerRepo, VoteRepo};

use crate::catalog::{self, parse_vote, Created, NewPlace, NewProduct, ProductCreated};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::pages::home::{render_home, HomeView};
use crate::pages::layout::{self, Chrome, Nav};
use crate::pages::list::{render_list, ListView};
use crate::pages::map::{render_map, MapView, PlaceForm};
use crate::pages::marker::{notice_text, render_marker, EditForm, MarkerView, VoteForm};
use crate::pages::products::{render_products, ProductForm, ProductsView};
use crate::pages::votes::render_votes;
use crate::pages::{with_query, Chip};
use crate::query::SpotlightParams;
use crate::state::AppState;
use crate::views::{MarkerSummary, SpotlightPick};

/// `?notice=` on the marker page.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
    pub notice: Option<String>,
}

/// The page, or the error rendered inside the page shell.
fn respond(chrome: &Chrome, result: AppResult<Response>) -> Response {
    result.unwrap_or_else(|e| error_page(chrome, &e))
}

fn error_page(chrome: &Chrome, err: &AppError) -> Response {
    let (status, code, message) = err.parts();
    if status.is_server_error() {
        tracing::error!(code, error = %err, "Page failed to load");
    }
    let body = layout::status_line("pageStatus", &message);
    (status, Html(layout::render(chrome, "", &body))).into_response()
}

/// Rendered page with a non-200 status, for re-rendered form failures.
fn html_with_status(status: StatusCode, html: String) -> Response {
    (status, Html(html)).into_response()
}

/// Redirect to the canonical query string when the raw one differs, so
/// shared URLs only carry filters that apply.
fn canonical_redirect(path: &str, raw: Option<&str>, canonical: &str) -> Option<Response> {
    match raw {
        Some(raw) if !raw.is_empty() && raw != canonical => {
            Some(Redirect::to(&with_query(path, canonical)).into_response())
        }
        _ => None,
    }
}

fn parse_marker_id(raw: &str) -> AppResult<MarkerId> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Core(CoreError::not_found("Marker", raw)))
}

fn invalid(message: &str) -> AppError {
    AppError::Core(CoreError::Validation(message.to_string()))
}

fn parse_coordinate(raw: &str) -> AppResult<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| invalid("Coordinates must be numbers."))
}

fn marker_href(id: MarkerId, notice: Option<&str>) -> String {
    match notice {
        Some(n) => format!("/marker/{id}?notice={n}"),
        None => format!("/marker/{id}"),
    }
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn craving_chips(lookups: &LookupTables, state: &AppState, group_type: GroupType) -> Vec<Chip> {
    let (scope, more_href) = match group_type {
        GroupType::Place => (CategoryScope::Places, "/map"),
        GroupType::Product => (CategoryScope::Products, "/products"),
    };
    let config = &state.config;
    let mut chips: Vec<Chip> = lookups
        .chip_categories(scope, CRAVING_CHIP_LIMIT)
        .into_iter()
        .map(|c| {
            let filter = ListFilter {
                group_type: Some(group_type),
                category_id: Some(c.id.clone()),
                min_rating: None,
            };
            let icon = lookups.icon_for(Some(c.id.as_str()), &config.public_base_url, &config.default_icon_url);
            Chip::link(with_query("/list", &filter.to_query_string()), c.name.clone()).with_icon(icon)
        })
        .collect();
    if !chips.is_empty() {
        chips.push(Chip::link(more_href, "…"));
    }
    chips
}

/// GET /
pub async fn home(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(params): Query<SpotlightParams>,
) -> Response {
    let chrome = Chrome::new("Home", Nav::Home, &user, &state.config);
    respond(&chrome, home_response(&state, &chrome, &params).await)
}

async fn home_response(state: &AppState, chrome: &Chrome, params: &SpotlightParams) -> AppResult<Response> {
    let store = state.store.as_ref();
    let lookups = LookupTables::load(store, CategoryScope::All).await?;
    let markers = MarkerRepo::list(store, &MarkerQuery::default()).await?;

    let spotlight = SpotlightPick::choose(
        &markers,
        params.last_shown(),
        &lookups,
        &state.config,
        &mut rand::rng(),
    );

    let mut recent = markers;
    sort_recent(&mut recent, |m| m.created_at);
    recent.truncate(RECENT_LIMIT);

    let view = HomeView {
        place_chips: craving_chips(&lookups, state, GroupType::Place),
        product_chips: craving_chips(&lookups, state, GroupType::Product),
        recent: MarkerSummary::many(recent, &lookups, &state.config),
        spotlight,
    };
    Ok(Html(render_home(chrome, &view)).into_response())
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /list?type=&category=&min_rating=
pub async fn list_page(
    State(state): State<AppState>,
    user: MaybeUser,
    RawQuery(raw): RawQuery,
    Query(params): Query<ListParams>,
) -> Response {
    let chrome = Chrome::new("List", Nav::List, &user, &state.config);
    respond(&chrome, list_response(&state, &chrome, raw.as_deref(), &params).await)
}

async fn list_response(
    state: &AppState,
    chrome: &Chrome,
    raw: Option<&str>,
    params: &ListParams,
) -> AppResult<Response> {
    let store = state.store.as_ref();
    let lookups = LookupTables::load(store, CategoryScope::All).await?;
    let filter = ListFilter::from_params(params, |id| lookups.has_category(id));
    if let Some(redirect) = canonical_redirect("/list", raw, &filter.to_query_string()) {
        return Ok(redirect);
    }

    let mut markers = MarkerRepo::list(store, &MarkerQuery::from(&filter)).await?;
    sort_by_rating_then_title(&mut markers);

    let view = ListView {
        filter: &filter,
        categories: lookups.categories(),
        rows: MarkerSummary::many(markers, &lookups, &state.config),
    };
    Ok(Html(render_list(chrome, &view)).into_response())
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// GET /map?category=&rating=&focus=
pub async fn map_page(
    State(state): State<AppState>,
    user: MaybeUser,
    RawQuery(raw): RawQuery,
    Query(params): Query<MapParams>,
) -> Response {
    let chrome = Chrome::new("Map", Nav::Map, &user, &state.config);
    let can_add = user.0.is_some();
    respond(&chrome, map_response(&state, &chrome, raw.as_deref(), &params, can_add).await)
}

async fn map_response(
    state: &AppState,
    chrome: &Chrome,
    raw: Option<&str>,
    params: &MapParams,
    can_add: bool,
) -> AppResult<Response> {
    let lookups = LookupTables::load(state.store.as_ref(), CategoryScope::Places).await?;
    let filter = MapFilter::from_params(params, |id| lookups.has_category(id));
    if let Some(redirect) = canonical_redirect("/map", raw, &filter.to_query_string()) {
        return Ok(redirect);
    }
    let html = map_html(state, chrome, &lookups, &filter, can_add, PlaceForm::default(), String::new()).await?;
    Ok(Html(html).into_response())
}

async fn map_html(
    state: &AppState,
    chrome: &Chrome,
    lookups: &LookupTables,
    filter: &MapFilter,
    can_add: bool,
    form: PlaceForm,
    save_status: String,
) -> AppResult<String> {
    let store = state.store.as_ref();
    let config = &state.config;

    let usage = MarkerRepo::place_category_usage(store).await?;
    let quick_categories: Vec<(&Category, String)> = lookups
        .rank_by_usage(&usage)
        .into_iter()
        .take(MAP_QUICK_CHIP_LIMIT)
        .map(|c| {
            let icon = lookups.icon_for(Some(c.id.as_str()), &config.public_base_url, &config.default_icon_url);
            (c, icon)
        })
        .collect();

    let markers = MarkerRepo::list(store, &MarkerQuery::from(filter)).await?;
    let pins = MarkerSummary::many(markers, lookups, config);

    let focused = match filter.focus {
        None => None,
        Some(id) => match pins.iter().find(|m| m.id() == id) {
            Some(pin) => Some(pin.clone()),
            None => MarkerRepo::find_by_id(store, id)
                .await?
                .filter(|m| m.is_active && m.is_place())
                .map(|m| MarkerSummary::new(m, lookups, config)),
        },
    };

    let view = MapView {
        filter,
        quick_categories,
        categories: lookups.categories(),
        pins,
        focused,
        can_add,
        form,
        save_status,
    };
    Ok(render_map(chrome, &view))
}

fn place_input(form: &PlaceForm) -> AppResult<NewPlace> {
    Ok(NewPlace {
        title: form.title.clone(),
        category_id: form.category_id.clone(),
        address: Some(form.address.clone()),
        lat: parse_coordinate(&form.lat)?,
        lon: parse_coordinate(&form.lon)?,
        vote: parse_vote(&form.vote)?,
    })
}

async fn submit_place_inner(state: &AppState, user: MaybeUser, form: &PlaceForm) -> AppResult<Created> {
    let auth = user.require()?;
    let input = place_input(form)?;
    catalog::create_place(auth.store(state).as_ref(), auth.user_id, input).await
}

/// POST /map/places
pub async fn submit_place(
    State(state): State<AppState>,
    user: MaybeUser,
    Form(form): Form<PlaceForm>,
) -> Response {
    let chrome = Chrome::new("Map", Nav::Map, &user, &state.config);
    let can_add = user.0.is_some();

    let err = match submit_place_inner(&state, user, &form).await {
        Ok(created) => {
            let notice = created.vote_error.as_ref().map(|_| "vote_failed");
            return Redirect::to(&marker_href(created.marker.id, notice)).into_response();
        }
        Err(e) => e,
    };

    let (status, _, message) = err.parts();
    let result = map_form_html(&state, &chrome, can_add, form, message)
        .await
        .map(|html| html_with_status(status, html));
    respond(&chrome, result)
}

/// The unfiltered map page around a rejected add-place form.
async fn map_form_html(
    state: &AppState,
    chrome: &Chrome,
    can_add: bool,
    form: PlaceForm,
    save_status: String,
) -> AppResult<String> {
    let lookups = LookupTables::load(state.store.as_ref(), CategoryScope::Places).await?;
    map_html(state, chrome, &lookups, &MapFilter::default(), can_add, form, save_status).await
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// GET /products
pub async fn products_page(State(state): State<AppState>, user: MaybeUser) -> Response {
    let chrome = Chrome::new("Products", Nav::Products, &user, &state.config);
    let can_add = user.0.is_some();
    let result = products_html(&state, &chrome, can_add, ProductForm::default(), String::new())
        .await
        .map(|html| Html(html).into_response());
    respond(&chrome, result)
}

async fn products_html(
    state: &AppState,
    chrome: &Chrome,
    can_add: bool,
    form: ProductForm,
    save_status: String,
) -> AppResult<String> {
    let store = state.store.as_ref();
    let lookups = LookupTables::load(store, CategoryScope::Products).await?;
    let mut products = MarkerRepo::list(store, &MarkerQuery::products()).await?;
    sort_by_rating_desc(&mut products);

    let view = ProductsView {
        rows: MarkerSummary::many(products, &lookups, &state.config),
        categories: lookups.categories(),
        brands: lookups.brands(),
        can_add,
        form,
        save_status,
    };
    Ok(render_products(chrome, &view))
}

async fn submit_product_inner(
    state: &AppState,
    user: MaybeUser,
    form: &ProductForm,
) -> AppResult<ProductCreated> {
    let auth = user.require()?;
    let input = NewProduct {
        title: form.title.clone(),
        category_id: form.category_id.clone(),
        brand_id: form.brand_id.clone(),
        vote: parse_vote(&form.vote)?,
    };
    catalog::create_product(auth.store(state).as_ref(), auth.user_id, input).await
}

/// POST /products
///
/// A product whose category and brand already exist redirects to that
/// product instead of creating a duplicate.
pub async fn submit_product(
    State(state): State<AppState>,
    user: MaybeUser,
    Form(form): Form<ProductForm>,
) -> Response {
    let chrome = Chrome::new("Products", Nav::Products, &user, &state.config);
    let can_add = user.0.is_some();

    let err = match submit_product_inner(&state, user, &form).await {
        Ok(ProductCreated::Existing(id)) => {
            return Redirect::to(&marker_href(id, Some("exists"))).into_response()
        }
        Ok(ProductCreated::New(created)) => {
            let notice = created.vote_error.as_ref().map(|_| "vote_failed");
            return Redirect::to(&marker_href(created.marker.id, notice)).into_response();
        }
        Err(e) => e,
    };

    let (status, _, message) = err.parts();
    let result = products_html(&state, &chrome, can_add, form, message)
        .await
        .map(|html| html_with_status(status, html));
    respond(&chrome, result)
}

// ---------------------------------------------------------------------------
// Marker detail
// ---------------------------------------------------------------------------

/// What a marker page render carries besides the marker itself.
#[derive(Default)]
struct MarkerPageState {
    notice: Option<&'static str>,
    edit: Option<EditForm>,
    vote_status: String,
    edit_status: String,
}

async fn marker_html(
    state: &AppState,
    chrome: &Chrome,
    user: Option<&AuthUser>,
    id: MarkerId,
    page: MarkerPageState,
) -> AppResult<String> {
    let store = state.store.as_ref();
    let marker = MarkerRepo::find_by_id(store, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Marker", id)))?;

    let scope = if marker.is_place() {
        CategoryScope::Places
    } else {
        CategoryScope::Products
    };
    let lookups = LookupTables::load(store, scope).await?;
    let vote = match user {
        Some(auth) => Some(VoteRepo::find_mine(auth.store(state).as_ref(), id, auth.user_id).await?),
        None => None,
    };

    let edit = page.edit.unwrap_or_else(|| EditForm::from_marker(&marker));
    let view = MarkerView {
        summary: MarkerSummary::new(marker, &lookups, &state.config),
        vote,
        categories: lookups.categories(),
        brands: lookups.brands(),
        edit,
        notice: page.notice,
        vote_status: page.vote_status,
        edit_status: page.edit_status,
    };
    Ok(render_marker(chrome, &view))
}

/// GET /marker/{id}
pub async fn marker_page(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(raw_id): Path<String>,
    Query(params): Query<NoticeParams>,
) -> Response {
    let chrome = Chrome::new("Marker", Nav::None, &user, &state.config);
    let page = MarkerPageState {
        notice: params.notice.as_deref().and_then(notice_text),
        ..MarkerPageState::default()
    };
    let result = match parse_marker_id(&raw_id) {
        Ok(id) => marker_html(&state, &chrome, user.0.as_ref(), id, page)
            .await
            .map(|html| Html(html).into_response()),
        Err(e) => Err(e),
    };
    respond(&chrome, result)
}

/// Run a marker action as the signed-in user; redirect back on success,
/// re-render with the failure otherwise.
async fn marker_action<F, Fut>(
    state: AppState,
    user: MaybeUser,
    raw_id: String,
    on_error: fn(String) -> MarkerPageState,
    action: F,
) -> Response
where
    F: FnOnce(AppState, AuthUser, MarkerId) -> Fut,
    Fut: std::future::Future<Output = AppResult<()>>,
{
    let chrome = Chrome::new("Marker", Nav::None, &user, &state.config);
    let id = match parse_marker_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return error_page(&chrome, &e),
    };

    let err = match user.clone().require() {
        Ok(auth) => match action(state.clone(), auth, id).await {
            Ok(()) => return Redirect::to(&marker_href(id, None)).into_response(),
            Err(e) => e,
        },
        Err(e) => e,
    };

    let (status, _, message) = err.parts();
    let result = marker_html(&state, &chrome, user.0.as_ref(), id, on_error(message))
        .await
        .map(|html| html_with_status(status, html));
    respond(&chrome, result)
}

fn vote_failure(message: String) -> MarkerPageState {
    MarkerPageState {
        vote_status: message,
        ..MarkerPageState::default()
    }
}

fn edit_failure(message: String) -> MarkerPageState {
    MarkerPageState {
        edit_status: message,
        ..MarkerPageState::default()
    }
}

/// POST /marker/{id}/vote
pub async fn submit_vote(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(raw_id): Path<String>,
    Form(form): Form<VoteForm>,
) -> Response {
    marker_action(state, user, raw_id, vote_failure, |state, auth, id| async move {
        let value = parse_vote(&form.vote)?;
        catalog::save_vote(auth.store(&state).as_ref(), id, auth.user_id, value).await?;
        Ok::<(), AppError>(())
    })
    .await
}

/// POST /marker/{id}/vote/clear
pub async fn submit_clear_vote(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(raw_id): Path<String>,
) -> Response {
    marker_action(state, user, raw_id, vote_failure, |state, auth, id| async move {
        catalog::clear_vote(auth.store(&state).as_ref(), id, auth.user_id).await?;
        Ok::<(), AppError>(())
    })
    .await
}

/// POST /marker/{id}/vote/reactivate
pub async fn submit_reactivate_vote(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(raw_id): Path<String>,
) -> Response {
    marker_action(state, user, raw_id, vote_failure, |state, auth, id| async move {
        catalog::reactivate_vote(auth.store(&state).as_ref(), id, auth.user_id).await?;
        Ok::<(), AppError>(())
    })
    .await
}

/// POST /marker/{id}/deactivate
pub async fn submit_deactivate(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(raw_id): Path<String>,
) -> Response {
    marker_action(state, user, raw_id, edit_failure, |state, auth, id| async move {
        catalog::deactivate_marker(auth.store(&state).as_ref(), id).await?;
        tracing::info!(marker_id = %id, user_id = %auth.user_id, "Marker deactivated from page");
        Ok::<(), AppError>(())
    })
    .await
}

fn update_input(form: &EditForm) -> AppResult<UpdateMarker> {
    Ok(UpdateMarker {
        title: form.title.clone(),
        category_id: form.category_id.clone(),
        brand_id: Some(form.brand_id.clone()),
        address: Some(form.address.clone()),
        lat: parse_coordinate(&form.lat)?,
        lon: parse_coordinate(&form.lon)?,
    })
}

/// POST /marker/{id}/edit
///
/// Failures re-render the form with what was typed.
pub async fn submit_edit(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(raw_id): Path<String>,
    Form(form): Form<EditForm>,
) -> Response {
    let chrome = Chrome::new("Marker", Nav::None, &user, &state.config);
    let id = match parse_marker_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return error_page(&chrome, &e),
    };

    let err = match edit_marker(&state, user.clone(), id, &form).await {
        Ok(_) => return Redirect::to(&marker_href(id, None)).into_response(),
        Err(e) => e,
    };

    let (status, _, message) = err.parts();
    let page = MarkerPageState {
        edit: Some(form),
        edit_status: message,
        ..MarkerPageState::default()
    };
    let result = marker_html(&state, &chrome, user.0.as_ref(), id, page)
        .await
        .map(|html| html_with_status(status, html));
    respond(&chrome, result)
}

async fn edit_marker(state: &AppState, user: MaybeUser, id: MarkerId, form: &EditForm) -> AppResult<Marker> {
    let auth = user.require()?;
    let input = update_input(form)?;
    catalog::update_marker(auth.store(state).as_ref(), id, input).await
}

// ---------------------------------------------------------------------------
// My votes
// ---------------------------------------------------------------------------

/// GET /votes
///
/// Guests are sent to the login page.
pub async fn votes_page(State(state): State<AppState>, user: MaybeUser) -> Response {
    let chrome = Chrome::new("My votes", Nav::Votes, &user, &state.config);
    let Some(auth) = user.0 else {
        return Redirect::to(&state.config.login_url).into_response();
    };

    let result = VoteRepo::list_mine(auth.store(&state).as_ref(), auth.user_id)
        .await
        .map_err(AppError::from)
        .map(|votes| Html(render_votes(&chrome, &votes)).into_response());
    respond(&chrome, result)
}
