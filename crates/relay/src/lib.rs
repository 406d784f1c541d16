//! Core domain for farabi-relay.
//!
//! farabi-relay accepts an authenticated JSON POST, checks that a fixed set of
//! fields is present, and forwards the payload as the `inputs` of a GitHub
//! Actions `workflow_dispatch` call. This crate holds everything about that
//! flow that does not touch the network: configuration, the payload model,
//! the error taxonomy, the shared-secret check, and the transport-neutral
//! [`handle`] function.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! The outbound call is expressed as the [`WorkflowDispatcher`] trait; the
//! `github` crate implements it over HTTP and the `listener` crate adapts
//! inbound HTTP requests to [`InboundRequest`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OwnerName`, `BranchName`, `RequestId`, etc.) |
//! | [`config`] | [`RelayConfig`] and the redacting [`Secret`] wrapper |
//! | [`payload`] | [`Payload`], [`REQUIRED_FIELDS`], and [`DispatchRequest`] |
//! | [`auth`] | Constant-time shared-secret check |
//! | [`dispatch`] | The [`WorkflowDispatcher`] port |
//! | [`handler`] | [`handle`]: method → auth → body → parse → validate → dispatch |
//! | [`errors`] | [`RelayError`] |

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod handler;
pub mod identifiers;
pub mod payload;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use auth::verify_api_key;
pub use config::{RelayConfig, RelayConfigBuilder, Secret, DEFAULT_API_BASE_URL, DEFAULT_BRANCH};
pub use dispatch::WorkflowDispatcher;
pub use errors::RelayError;
pub use handler::{handle, Dispatched, InboundMethod, InboundRequest};
pub use identifiers::{BranchName, OwnerName, RepositoryName, RequestId, WorkflowFile};
pub use payload::{DispatchRequest, Payload, REQUIRED_FIELDS};
