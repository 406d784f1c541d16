//! Process-wide relay configuration.
//!
//! A [`RelayConfig`] is built once at start-up (the `cli` crate fills a
//! [`RelayConfigBuilder`] from flags and environment variables) and then
//! shared read-only with every request. Handler code never reads the process
//! environment itself.

use crate::errors::RelayError;
use crate::identifiers::{BranchName, OwnerName, RepositoryName, WorkflowFile};

/// Branch used as the dispatch `ref` when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A credential whose value must never reach a log line.
///
/// `Debug` and `Display` both print `[REDACTED]`; the value is only reachable
/// through [`Secret::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a credential, returning `None` if it is empty.
    ///
    /// Unlike identifiers the value is kept byte-for-byte: whitespace inside a
    /// secret is significant.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// ---------------------------------------------------------------------------
// RelayConfig
// ---------------------------------------------------------------------------

/// Immutable configuration for one relay process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    owner: OwnerName,
    repository: RepositoryName,
    workflow_file: WorkflowFile,
    branch: BranchName,
    github_token: Secret,
    api_key: Secret,
    api_base_url: String,
}

impl RelayConfig {
    /// Starts a new builder.
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    pub fn owner(&self) -> &OwnerName {
        &self.owner
    }

    pub fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    pub fn workflow_file(&self) -> &WorkflowFile {
        &self.workflow_file
    }

    /// The dispatch `ref`. Always set; falls back to [`DEFAULT_BRANCH`].
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Bearer token for the outbound dispatch call.
    pub fn github_token(&self) -> &Secret {
        &self.github_token
    }

    /// Shared secret expected in the inbound `x-api-key` header.
    pub fn api_key(&self) -> &Secret {
        &self.api_key
    }

    /// API base URL without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Full URL of the workflow-dispatch endpoint:
    /// `{base}/repos/{owner}/{repo}/actions/workflows/{workflow}/dispatches`.
    pub fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base_url, self.owner, self.repository, self.workflow_file
        )
    }
}

/// Collects raw configuration strings and validates them in [`build`](Self::build).
#[derive(Debug, Default, Clone)]
pub struct RelayConfigBuilder {
    owner: Option<String>,
    repository: Option<String>,
    workflow_file: Option<String>,
    branch: Option<String>,
    github_token: Option<String>,
    api_key: Option<String>,
    api_base_url: Option<String>,
}

impl RelayConfigBuilder {
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn workflow_file(mut self, workflow_file: impl Into<String>) -> Self {
        self.workflow_file = Some(workflow_file.into());
        self
    }

    /// Sets the dispatch branch. `None` or a blank value selects [`DEFAULT_BRANCH`].
    pub fn branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the API base URL (GitHub Enterprise, or a local test double).
    /// `None` selects [`DEFAULT_API_BASE_URL`].
    pub fn api_base_url(mut self, url: Option<String>) -> Self {
        self.api_base_url = url;
        self
    }

    /// Validates the collected values.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Configuration`] naming the first required value
    /// that is missing or blank, or an API base URL that is not `http(s)://`.
    pub fn build(self) -> Result<RelayConfig, RelayError> {
        let owner = self
            .owner
            .and_then(OwnerName::new)
            .ok_or_else(|| RelayError::configuration("GH_OWNER is required"))?;
        let repository = self
            .repository
            .and_then(RepositoryName::new)
            .ok_or_else(|| RelayError::configuration("GH_REPO is required"))?;
        let workflow_file = self
            .workflow_file
            .and_then(WorkflowFile::new)
            .ok_or_else(|| RelayError::configuration("WORKFLOW_FILE is required"))?;
        let github_token = self
            .github_token
            .and_then(Secret::new)
            .ok_or_else(|| RelayError::configuration("GH_TOKEN is required"))?;
        let api_key = self
            .api_key
            .and_then(Secret::new)
            .ok_or_else(|| RelayError::configuration("API_KEY is required"))?;

        let branch = match self.branch.and_then(BranchName::new) {
            Some(branch) => branch,
            None => BranchName::new(DEFAULT_BRANCH)
                .ok_or_else(|| RelayError::configuration("default branch is blank"))?,
        };

        let api_base_url = match self.api_base_url.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_API_BASE_URL.to_string(),
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(RelayError::configuration(format!(
                        "API base URL must start with http:// or https://, got '{url}'"
                    )));
                }
                url.trim_end_matches('/').to_string()
            }
        };

        Ok(RelayConfig {
            owner,
            repository,
            workflow_file,
            branch,
            github_token,
            api_key,
            api_base_url,
        })
    }
}
