//! The outbound port.
//!
//! [`WorkflowDispatcher`] is the only thing the relay needs from the outside
//! world. The `github` crate supplies the HTTP implementation; tests supply
//! recording fakes.

use async_trait::async_trait;

use crate::config::RelayConfig;
use crate::errors::RelayError;
use crate::payload::DispatchRequest;

/// Triggers one workflow run.
///
/// Implementations make exactly one attempt per call. Two identical requests
/// produce two dispatches.
#[async_trait]
pub trait WorkflowDispatcher: Send + Sync {
    /// Sends `request` to the workflow-dispatch endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// - [`RelayError::UpstreamError`] when the endpoint answers with a
    ///   non-success status; carries the status and the response body text.
    /// - [`RelayError::UpstreamUnreachable`] when no response could be
    ///   obtained at all.
    async fn dispatch(
        &self,
        config: &RelayConfig,
        request: &DispatchRequest,
    ) -> Result<(), RelayError>;
}
