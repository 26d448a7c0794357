use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use slotledger_auth::AuthzError;
use slotledger_infra::{LedgerError, ScopeError, StoreError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        AuthzError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        StoreError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        StoreError::Unavailable(msg) => {
            error!(error = %msg, "store unavailable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage unavailable")
        }
    }
}

/// Denials stay 403; they are never disguised as 404.
pub fn scope_error_to_response(err: ScopeError) -> axum::response::Response {
    match err {
        ScopeError::Unauthorized(reason) => {
            json_error(StatusCode::FORBIDDEN, "unauthorized", reason.to_string())
        }
        ScopeError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        ScopeError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ScopeError::Store(e) => store_error_to_response(e),
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        LedgerError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        LedgerError::Inactive(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not active"))
        }
        LedgerError::Store(e) => store_error_to_response(e),
    }
}

/// A failure of our own machinery (e.g. a panicked blocking task).
pub fn internal_error(err: impl std::fmt::Display) -> axum::response::Response {
    error!(error = %err, "internal error");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}

pub fn bad_request(code: &'static str, message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, code, message)
}
