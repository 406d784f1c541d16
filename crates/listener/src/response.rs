use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use relay::RelayError;

/// [`RelayError`] as an HTTP response: its status code and its `Display`
/// text as a plain-text body.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.0.to_string()).into_response()
    }
}
