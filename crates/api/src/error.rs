use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tba_core::error::CoreError;
use tba_db::StoreError;
use validator::ValidationErrors;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for row store
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses; page handlers use [`AppError::parts`] to show the same message
/// in the page's status line.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tba_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A row store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Input that failed DTO validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for the 401 every write endpoint returns to guests.
    pub fn login_required() -> Self {
        Self::Core(CoreError::Unauthorized("Please login first.".into()))
    }

    /// HTTP status, machine code, and user-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Row store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                validation_message(errors),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a row store error into an HTTP status, error code, and message.
///
/// - Unique key violations map to 409.
/// - Other store rejections keep their status and show the store's message,
///   which users see verbatim.
/// - Transport and payload failures map to 502 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        e if e.is_unique_violation() => (StatusCode::CONFLICT, "CONFLICT", e.to_string()),
        StoreError::Api {
            status, message, ..
        } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), error = %message, "Row store failure");
                (StatusCode::BAD_GATEWAY, "STORE_ERROR", message.clone())
            } else {
                let code = match status {
                    StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
                    StatusCode::FORBIDDEN => "FORBIDDEN",
                    StatusCode::NOT_FOUND => "NOT_FOUND",
                    _ => "STORE_REJECTED",
                };
                (status, code, message.clone())
            }
        }
        other => {
            tracing::error!(error = %other, "Row store unavailable");
            (
                StatusCode::BAD_GATEWAY,
                "STORE_UNAVAILABLE",
                "The catalog is unreachable right now. Try again.".to_string(),
            )
        }
    }
}

/// First message of each failing field, schema-level messages first.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| (*field != "__all__", field.to_string()));

    let messages: Vec<String> = fields
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                e.message
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| format!("Invalid {field}."))
            })
        })
        .collect();

    if messages.is_empty() {
        "Invalid input.".to_string()
    } else {
        messages.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Title required."))]
        title: String,
        #[validate(range(min = 1, max = 10))]
        vote: i64,
    }

    #[test]
    fn validation_messages_fall_back_to_field_name() {
        let errors = Form {
            title: String::new(),
            vote: 11,
        }
        .validate()
        .unwrap_err();
        let (status, code, message) = AppError::from(errors).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "Title required. Invalid vote.");
    }

    #[test]
    fn unique_violation_is_conflict() {
        let err = AppError::Store(StoreError::Api {
            status: 409,
            code: Some("23505".into()),
            message: "duplicate key value violates unique constraint".into(),
        });
        let (status, code, _) = err.parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");
    }

    #[test]
    fn policy_rejection_keeps_status_and_message() {
        let err = AppError::Store(StoreError::Api {
            status: 403,
            code: Some("42501".into()),
            message: "new row violates row-level security policy".into(),
        });
        assert_eq!(
            err.parts(),
            (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "new row violates row-level security policy".to_string()
            )
        );
    }

    #[test]
    fn store_server_errors_are_bad_gateway() {
        let err = AppError::Store(StoreError::Api {
            status: 503,
            code: None,
            message: "upstream down".into(),
        });
        assert_eq!(err.parts().0, StatusCode::BAD_GATEWAY);
    }
}
