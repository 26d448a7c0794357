use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use slotledger_auth::RequestCredentials;

use crate::app::services::AppServices;
use crate::context::RequestContext;

/// Resolve the caller and attach a [`RequestContext`].
///
/// Never rejects: bad or missing credentials make the request anonymous and
/// each route decides whether that is acceptable.
pub async fn identity_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let headers = req.headers();
    let user_agent = header_str(headers, header::USER_AGENT).map(str::to_string);
    let bearer = extract_bearer(headers);
    let session_id = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| services.cookie.extract(cookie));

    let identity = services.resolver.resolve(
        RequestCredentials {
            bearer,
            fingerprint: user_agent.as_deref(),
            session_id,
        },
        Utc::now(),
    );

    req.extensions_mut()
        .insert(RequestContext::new(identity, user_agent));

    next.run(req).await
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let token = header_str(headers, header::AUTHORIZATION)?
        .strip_prefix("Bearer ")?
        .trim();
    (!token.is_empty()).then_some(token)
}
