//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, credential binder, order services
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use slotledger_infra::AppConfig;
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router over fresh in-memory services.
pub fn build_app(config: AppConfig) -> Router {
    build_app_with(Arc::new(services::AppServices::in_memory(config)))
}

/// Build the router over pre-wired (possibly pre-seeded) services.
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    // Identity is resolved for every routed request; routes enforce it.
    let routed = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            services,
            middleware::identity_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routed)
        .layer(ServiceBuilder::new())
}
