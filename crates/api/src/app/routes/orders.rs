use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    response::IntoResponse,
};

use slotledger_auth::Capability;
use slotledger_core::{OrderId, PageRequest};
use slotledger_orders::{ListFilter, OrderStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestContext;

const READ: [Capability; 2] = [Capability::ViewAllOrders, Capability::ViewManagedOrders];
const WRITE: [Capability; 2] = [Capability::UpdateAnyOrder, Capability::UpdateManagedOrder];

fn parse_order_id(raw: &str) -> Result<OrderId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::bad_request("invalid_id", "invalid order id"))
}

fn parse_status(raw: &str) -> Result<OrderStatus, axum::response::Response> {
    raw.parse()
        .map_err(|e: slotledger_orders::UnknownStatus| errors::bad_request("invalid_status", e.to_string()))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Query(q): Query<dto::ListOrdersQuery>,
) -> axum::response::Response {
    let principal = match ctx.require_any(&READ) {
        Ok(p) => p,
        Err(e) => return errors::authz_error_to_response(e),
    };

    let status = match q.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_status(raw) {
            Ok(s) => Some(s),
            Err(resp) => return resp,
        },
        None => None,
    };
    let filter = ListFilter {
        status,
        name: q.name,
    };
    let defaults = PageRequest::default();
    let page = PageRequest::new(q.page.unwrap_or(defaults.page), q.size.unwrap_or(defaults.size));

    match services.scoper.list_orders(principal, &filter, page) {
        Ok(page) => Json(dto::OrderPageView::from(page)).into_response(),
        Err(e) => errors::scope_error_to_response(e),
    }
}

/// The caller's own order history.
pub async fn list_own_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    let principal = match ctx.require(Capability::ViewOwnOrders) {
        Ok(p) => p,
        Err(e) => return errors::authz_error_to_response(e),
    };

    match services.scoper.list_own_orders(principal) {
        Ok(orders) => {
            let items: Vec<dto::OrderView> = orders.into_iter().map(Into::into).collect();
            Json(items).into_response()
        }
        Err(e) => errors::scope_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = match ctx.require_any(&READ) {
        Ok(p) => p,
        Err(e) => return errors::authz_error_to_response(e),
    };
    let id = match parse_order_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.scoper.get_order(principal, id) {
        Ok(order) => Json(dto::OrderView::from(order)).into_response(),
        Err(e) => errors::scope_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    let principal = match ctx.require_any(&WRITE) {
        Ok(p) => p,
        Err(e) => return errors::authz_error_to_response(e),
    };
    let id = match parse_order_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match parse_status(&body.status) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.scoper.update_status(principal, id, status) {
        Ok(order) => Json(dto::OrderView::from(order)).into_response(),
        Err(e) => errors::scope_error_to_response(e),
    }
}
