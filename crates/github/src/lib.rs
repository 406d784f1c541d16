//! farabi-relay GitHub infrastructure adapter.
//!
//! Implements [`relay::WorkflowDispatcher`] against the GitHub Actions
//! `workflow_dispatch` endpoint:
//!
//! ```text
//! POST {api_base}/repos/{owner}/{repo}/actions/workflows/{workflow}/dispatches
//! Authorization: Bearer <GH_TOKEN>
//! Accept: application/vnd.github+json
//! User-Agent: farabi-mock-worker
//! Content-Type: application/json
//!
//! {"ref": "<branch>", "inputs": { ...payload }}
//! ```
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. It sends
//! exactly one request per dispatch and maps the outcome onto
//! [`relay::RelayError`]; the [`relay`] crate never sees `reqwest` types.
//!
//! ## Error mapping
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx | `Ok(())` |
//! | any other status | `RelayError::UpstreamError { status, body }` |
//! | no response (DNS, connect, TLS) or unreadable error body | `RelayError::UpstreamUnreachable` |

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, error, warn};

use relay::{DispatchRequest, RelayConfig, RelayError, WorkflowDispatcher};

/// `User-Agent` sent on every dispatch call.
pub const DISPATCH_USER_AGENT: &str = "farabi-mock-worker";

/// GitHub's JSON media type.
pub const GITHUB_JSON: &str = "application/vnd.github+json";

/// [`WorkflowDispatcher`] backed by a pooled [`reqwest::Client`].
///
/// Cheap to share behind an `Arc`; the client is thread-safe and reuses
/// connections across requests.
#[derive(Debug, Clone)]
pub struct GithubDispatchClient {
    http: reqwest::Client,
}

impl GithubDispatchClient {
    /// Creates a client with no request timeout; any deadline comes from the
    /// hosting infrastructure.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WorkflowDispatcher for GithubDispatchClient {
    async fn dispatch(
        &self,
        config: &RelayConfig,
        request: &DispatchRequest,
    ) -> Result<(), RelayError> {
        let url = config.dispatch_url();
        debug!(%url, git_ref = %request.git_ref, "sending workflow dispatch");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", config.github_token().expose()))
            .header(ACCEPT, GITHUB_JSON)
            .header(USER_AGENT, DISPATCH_USER_AGENT)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "workflow dispatch request failed");
                unreachable_error(e)
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "workflow dispatch accepted");
            return Ok(());
        }

        let body = response.text().await.map_err(|e| {
            error!(error = %e, status = status.as_u16(), "failed to read dispatch error body");
            unreachable_error(e)
        })?;
        warn!(status = status.as_u16(), "workflow dispatch rejected");

        Err(RelayError::UpstreamError {
            status: status.as_u16(),
            body,
        })
    }
}

fn unreachable_error(err: reqwest::Error) -> RelayError {
    RelayError::UpstreamUnreachable {
        reason: err.without_url().to_string(),
    }
}
