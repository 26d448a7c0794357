use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, warn};

use slotledger_auth::{Role, hash_password, verify_password};
use slotledger_infra::{NewPrincipal, PrincipalStore};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestContext;

/// Self-service registration. Always grants `CUSTOMER`.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let name = body.name.trim();
    let email = body.email.trim();
    if name.is_empty() || email.is_empty() || body.password.is_empty() {
        return errors::bad_request("validation_error", "name, email and password are required");
    }

    // argon2 hashing blocks; run it off the async workers.
    let password = body.password;
    let password_hash = match tokio::task::spawn_blocking(move || hash_password(&password)).await {
        Ok(Ok(h)) => h,
        Ok(Err(e)) => return errors::bad_request("validation_error", e.to_string()),
        Err(e) => return errors::internal_error(e),
    };

    let record = match services.principals.insert(NewPrincipal {
        name: name.to_string(),
        email: email.to_string(),
        roles: BTreeSet::from([Role::Customer]),
        password_hash,
    }) {
        Ok(r) => r,
        Err(e) => return errors::store_error_to_response(e),
    };

    info!(principal_id = %record.principal.id, "principal registered");
    (
        StatusCode::CREATED,
        Json(dto::PrincipalView::from(&record.principal)),
    )
        .into_response()
}

/// Password login. Issues a token bound to the caller's `User-Agent` and a
/// fresh session id, delivered as an HTTP-only cookie.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let record = match services.principals.find_by_email(&body.email) {
        Ok(Some(r)) => r,
        Ok(None) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid email or password");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if !record.principal.active {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "account not active");
    }

    let password = body.password;
    let stored = record.password_hash.clone();
    let verified = match tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await {
        Ok(v) => v,
        Err(e) => return errors::internal_error(e),
    };
    if !verified {
        warn!(principal_id = %record.principal.id, "password mismatch");
        return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid email or password");
    }

    let credential = match services
        .binder
        .issue(&record.principal.email, ctx.user_agent(), Utc::now())
    {
        Ok(c) => c,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "issue_error", e.to_string());
        }
    };

    info!(principal_id = %record.principal.id, "login succeeded");
    let body = dto::LoginResponse {
        token: credential.token,
        roles: record.principal.roles.iter().map(|r| r.as_str()).collect(),
        expires_at: credential.expires_at,
    };
    (
        StatusCode::OK,
        [(header::SET_COOKIE, services.cookie.render(&credential.sid))],
        Json(body),
    )
        .into_response()
}
