use axum::{
    Router,
    routing::{get, post, put},
};

pub mod auth;
pub mod orders;
pub mod resources;
pub mod system;

/// Router for every endpoint behind the identity middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/orders", get(orders::list_orders))
        .route("/orders/mine", get(orders::list_own_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", put(orders::update_status))
        .route("/resources/:id/book", post(resources::book))
}
