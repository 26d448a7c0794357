use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use slotledger_auth::Capability;
use slotledger_core::ResourceId;
use slotledger_orders::BookingSlot;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestContext;

/// Book one or more slots on a resource and record the booking as an order.
pub async fn book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::BookRequest>,
) -> axum::response::Response {
    let customer = match ctx.require(Capability::PlaceBooking) {
        Ok(p) => p,
        Err(e) => return errors::authz_error_to_response(e),
    };
    let resource_id: ResourceId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::bad_request("invalid_id", "invalid resource id"),
    };

    let slots = match body
        .slots
        .iter()
        .map(|s| BookingSlot::parse(&body.date, &s.start_time, &s.end_time, s.unit.unwrap_or(1)))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(v) => v,
        Err(e) => return errors::bad_request("validation_error", e.to_string()),
    };

    match services
        .ledger
        .book_resource(customer, resource_id, &slots, Utc::now())
    {
        Ok(receipt) => (StatusCode::CREATED, Json(dto::BookingView::from(receipt))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
