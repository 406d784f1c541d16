//! Shared-secret check for the inbound `x-api-key` header.

use constant_time_eq::constant_time_eq;

use crate::config::Secret;
use crate::errors::RelayError;

/// Header that carries the caller's shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks the presented key against the configured secret.
///
/// `presented` is the raw header value. Equality is exact (no trimming,
/// case-sensitive, no text decoding) and compared in constant time over the
/// bytes, so a configured key containing non-ASCII UTF-8 matches a header
/// carrying the same bytes.
///
/// # Errors
///
/// Returns [`RelayError::Unauthorized`] when `presented` is `None` or differs
/// from `expected`.
pub fn verify_api_key(presented: Option<&[u8]>, expected: &Secret) -> Result<(), RelayError> {
    match presented {
        Some(key) if constant_time_eq(key, expected.expose().as_bytes()) => Ok(()),
        _ => Err(RelayError::Unauthorized),
    }
}
