//! The request handler, independent of any HTTP framework.
//!
//! [`handle`] runs the gates in a fixed order and stops at the first failure:
//!
//! ```text
//! Start → MethodChecked → Authorized → BodyRead → Parsed → FieldsValidated → Dispatched
//!   │          │              │            │         │            │
//!   └─ 405     └─ 401         └─ 413       └─ 400    └─ 400       └─ 500 / 502
//! ```
//!
//! The body is supplied as a future and only awaited once the method and
//! api key have been accepted, so an unauthenticated caller can never make
//! the relay buffer its body.
//!
//! Nothing is retried. The caller (the `listener` crate) turns the result
//! into an HTTP response.

use std::future::Future;

use tracing::debug;

use crate::auth::verify_api_key;
use crate::config::RelayConfig;
use crate::dispatch::WorkflowDispatcher;
use crate::errors::RelayError;
use crate::identifiers::BranchName;
use crate::payload::{DispatchRequest, Payload};

/// The only distinction the relay makes between request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMethod {
    Post,
    Other,
}

/// The request-line and header parts of an inbound request the relay looks at.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub method: InboundMethod,
    /// Raw bytes of the `x-api-key` header, if present.
    pub api_key: Option<&'a [u8]>,
}

/// Summary of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Branch the workflow was dispatched on.
    pub git_ref: BranchName,
    /// Number of inputs forwarded, including the required fields.
    pub input_count: usize,
}

/// Validates `request`, reads `body`, and forwards the payload through
/// `dispatcher`.
///
/// `body` is not polled unless the method and auth gates pass.
///
/// # Errors
///
/// The first failing gate's [`RelayError`]; see the module docs for order.
/// A failure from `body` is returned unchanged.
pub async fn handle<B, F>(
    request: InboundRequest<'_>,
    body: F,
    config: &RelayConfig,
    dispatcher: &dyn WorkflowDispatcher,
) -> Result<Dispatched, RelayError>
where
    F: Future<Output = Result<B, RelayError>>,
    B: AsRef<[u8]>,
{
    if request.method != InboundMethod::Post {
        return Err(RelayError::MethodNotAllowed);
    }

    verify_api_key(request.api_key, config.api_key())?;

    let body = body.await?;
    let payload = Payload::parse(body.as_ref())?;
    payload.validate()?;

    let input_count = payload.len();
    debug!(
        input_count,
        fields = ?payload.field_names().collect::<Vec<_>>(),
        "payload validated"
    );

    let dispatch = DispatchRequest::new(config.branch().clone(), payload);
    dispatcher.dispatch(config, &dispatch).await?;

    Ok(Dispatched {
        git_ref: dispatch.git_ref,
        input_count,
    })
}
