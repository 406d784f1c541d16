//! farabi-relay inbound HTTP surface.
//!
//! Binds one catch-all route: every method on every path reaches
//! [`handler::relay_request`], which hands the method, the `x-api-key`
//! header and the raw body to [`relay::handle`] and turns the outcome into a
//! response. Method checking happens inside the relay so that non-POST
//! requests get the relay's own `405 Method Not Allowed` body.
//!
//! | Outcome | Status | Body | Content-Type |
//! |---------|--------|------|--------------|
//! | dispatched | 200 | `{"ok":true}` | `application/json` |
//! | any [`relay::RelayError`] | [`relay::RelayError::status_code`] | error `Display` | `text/plain; charset=utf-8` |
//!
//! The body is read only after the method and api key are accepted, so
//! method and auth rejections never depend on body size. A body over
//! [`MAX_BODY_BYTES`] from an authorised caller is answered with `413`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** No validation rules live here; this crate only
//! translates between `axum` types and the [`relay`] crate.

mod handler;
mod response;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use relay::{RelayConfig, WorkflowDispatcher};

pub use handler::relay_request;
pub use response::ApiError;

/// Largest request body the relay will buffer, in bytes.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub dispatcher: Arc<dyn WorkflowDispatcher>,
}

impl AppState {
    pub fn new(config: RelayConfig, dispatcher: Arc<dyn WorkflowDispatcher>) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }
}

/// Builds the relay router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(relay_request)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serves the relay on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after `shutdown` fires.
///
/// # Errors
///
/// Returns the underlying I/O error if the server stops abnormally.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, dispatch_url = %state.config.dispatch_url(), "relay listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
