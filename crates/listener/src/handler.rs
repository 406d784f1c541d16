use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, warn, Span};

use relay::{auth::API_KEY_HEADER, InboundMethod, InboundRequest, RelayError, RequestId};

use crate::{response::ApiError, AppState, MAX_BODY_BYTES};

/// Catch-all handler: method → auth → body → parse → validate → dispatch.
///
/// The body is taken unbuffered and only read, up to [`MAX_BODY_BYTES`],
/// after the method and api key are accepted.
#[tracing::instrument(
    name = "relay_request",
    skip_all,
    fields(
        request_id = %RequestId::new_random(),
        method = %method,
        status = tracing::field::Empty,
    )
)]
pub async fn relay_request(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let inbound = InboundRequest {
        method: if method == Method::POST {
            InboundMethod::Post
        } else {
            InboundMethod::Other
        },
        api_key: headers.get(API_KEY_HEADER).map(|value| value.as_bytes()),
    };
    let read_body = async move {
        to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|_| RelayError::PayloadTooLarge {
                limit: MAX_BODY_BYTES,
            })
    };

    match relay::handle(inbound, read_body, &state.config, state.dispatcher.as_ref()).await {
        Ok(dispatched) => {
            Span::current().record("status", 200);
            info!(
                git_ref = %dispatched.git_ref,
                input_count = dispatched.input_count,
                "workflow dispatched"
            );
            (StatusCode::OK, Json(json!({ "ok": true }))).into_response()
        }
        Err(err) => {
            Span::current().record("status", err.status_code());
            log_rejection(&err);
            ApiError(err).into_response()
        }
    }
}

fn log_rejection(err: &RelayError) {
    let kind = err.kind();
    match err {
        RelayError::Unauthorized => warn!(kind, "rejected: bad or missing api key"),
        RelayError::MissingField { field } => info!(kind, field, "rejected: required field missing"),
        RelayError::PayloadTooLarge { limit } => warn!(kind, limit, "rejected: body over limit"),
        RelayError::UpstreamError { status, .. } => {
            error!(kind, upstream_status = status, "dispatch rejected by GitHub")
        }
        RelayError::UpstreamUnreachable { reason } => {
            error!(kind, reason = %reason, "GitHub unreachable")
        }
        _ => info!(kind, "rejected"),
    }
}
