//! Newtype identifiers.
//!
//! The owner, repository, workflow file and branch are all plain strings on
//! the wire, and all four end up interpolated into the same dispatch URL. Each
//! is its own newtype so a repository name can never be passed where a
//! workflow file is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or whitespace only. A non-blank value is kept exactly as given.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() {
                    None
                } else {
                    Some(Self(v))
                }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The GitHub user or organisation that owns the target repository.
    OwnerName
}

string_id! {
    /// The target repository name, without the owner prefix.
    RepositoryName
}

string_id! {
    /// The workflow to dispatch: a file name under `.github/workflows/`
    /// (e.g. `"mock.yml"`) or the workflow's numeric id.
    WorkflowFile
}

string_id! {
    /// A Git branch name (e.g. `"main"`). Sent as the dispatch `ref`.
    BranchName
}

// ---------------------------------------------------------------------------

/// Identifies one inbound request.
///
/// Generated fresh for every request and attached to its tracing span so the
/// validation outcome and the outbound dispatch can be correlated in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
