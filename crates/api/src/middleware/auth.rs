//! Access token extractors for Axum handlers.
//!
//! The token comes from an `Authorization: Bearer` header (API clients) or
//! the [`ACCESS_TOKEN_COOKIE`] cookie (pages), in that order.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tba_core::error::CoreError;
use tba_core::types::UserId;
use tba_db::DynStore;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Cookie holding the access token for server-rendered pages.
pub const ACCESS_TOKEN_COOKIE: &str = "tba_access_token";

/// Authenticated user extracted from a valid access token.
///
/// ```ignore
/// async fn my_handler(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<()>> {
///     let store = user.store(&state);
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id (from `claims.sub`).
    pub user_id: UserId,
    /// Shown in the page header.
    pub email: Option<String>,
    /// The raw token, forwarded to the row store.
    pub access_token: String,
}

impl AuthUser {
    /// The row store as this user, so the store's row-level policies see
    /// the real caller. Backends without callers return the shared store.
    pub fn store(&self, state: &AppState) -> DynStore {
        state
            .store
            .for_user(&self.access_token)
            .unwrap_or_else(|| state.store.clone())
    }
}

/// Where a request carries its token, if anywhere.
enum TokenSource {
    None,
    Malformed,
    Found(String),
}

fn find_token(parts: &Parts) -> TokenSource {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        return match header.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            Some(token) if !token.trim().is_empty() => TokenSource::Found(token.trim().to_string()),
            _ => TokenSource::Malformed,
        };
    }

    let jar = CookieJar::from_headers(&parts.headers);
    match jar.get(ACCESS_TOKEN_COOKIE).map(Cookie::value) {
        Some(token) if !token.is_empty() => TokenSource::Found(token.to_string()),
        _ => TokenSource::None,
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match find_token(parts) {
            TokenSource::Found(token) => token,
            TokenSource::None => return Err(AppError::login_required()),
            TokenSource::Malformed => {
                return Err(AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                )))
            }
        };

        let claims = validate_token(&token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            access_token: token,
        })
    }
}

/// The signed-in user when the request carries a valid token.
///
/// Missing, malformed, and expired tokens all read as a guest.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    /// The user, or the 401 that write actions answer guests with.
    pub fn require(self) -> Result<AuthUser, AppError> {
        self.0.ok_or_else(AppError::login_required)
    }

    pub fn email(&self) -> Option<&str> {
        self.0.as_ref().and_then(|u| u.email.as_deref())
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
