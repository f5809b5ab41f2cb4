//! Request ID middleware for Tower-compatible stacks.
//!
//! The generator layer must sit outside the propagator so the propagator sees
//! the minted id and echoes it, or the caller's `x-request-id`, on the response.

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request identifier on requests and responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Layer that assigns a UUID `x-request-id` when the caller did not send one.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}
