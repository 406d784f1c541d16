//! Command-line and environment configuration.
//!
//! Every flag can also be supplied through the environment variable named
//! next to it. The parsed [`Args`] are converted into a
//! [`relay::RelayConfig`] once and not consulted again.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

use relay::{RelayConfig, RelayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line human-readable output for local development.
    Pretty,
}

/// Relays authenticated form submissions to a GitHub Actions workflow dispatch.
#[derive(Debug, Parser)]
#[command(name = "farabi-relay", version, about)]
pub struct Args {
    /// Token used as the bearer credential for the dispatch call.
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub gh_token: String,

    /// Owner of the repository holding the workflow.
    #[arg(long, env = "GH_OWNER")]
    pub gh_owner: String,

    /// Repository holding the workflow.
    #[arg(long, env = "GH_REPO")]
    pub gh_repo: String,

    /// Workflow file name (e.g. `mock.yml`) or numeric workflow id.
    #[arg(long, env = "WORKFLOW_FILE")]
    pub workflow_file: String,

    /// Branch to run the workflow on. Defaults to `main`.
    #[arg(long, env = "BRANCH")]
    pub branch: Option<String>,

    /// Shared secret callers must send in the `x-api-key` header.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// GitHub REST API base URL. Defaults to `https://api.github.com`.
    #[arg(long, env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Address the relay listens on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8787")]
    pub bind: SocketAddr,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OTLP/HTTP traces endpoint (e.g. `http://localhost:4318/v1/traces`).
    /// Spans are only exported when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Args {
    /// Builds the validated relay configuration.
    pub fn relay_config(&self) -> Result<RelayConfig, RelayError> {
        RelayConfig::builder()
            .owner(&self.gh_owner)
            .repository(&self.gh_repo)
            .workflow_file(&self.workflow_file)
            .branch(self.branch.clone())
            .github_token(&self.gh_token)
            .api_key(&self.api_key)
            .api_base_url(self.github_api_url.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "farabi-relay",
            "--gh-token",
            "ghp_abc",
            "--gh-owner",
            "farabi",
            "--gh-repo",
            "claims",
            "--workflow-file",
            "mock.yml",
            "--api-key",
            "shared",
            "--branch",
            "release",
            "--bind",
            "127.0.0.1:9000",
            "--log-format",
            "pretty",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_map_onto_relay_config() {
        let args = parse(&["--github-api-url", "http://localhost:3000/"]);
        assert_eq!(args.bind, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(args.log_format, LogFormat::Pretty);

        let config = args.relay_config().unwrap();
        assert_eq!(config.owner().as_str(), "farabi");
        assert_eq!(config.repository().as_str(), "claims");
        assert_eq!(config.workflow_file().as_str(), "mock.yml");
        assert_eq!(config.branch().as_str(), "release");
        assert_eq!(config.github_token().expose(), "ghp_abc");
        assert_eq!(config.api_key().expose(), "shared");
        assert_eq!(
            config.dispatch_url(),
            "http://localhost:3000/repos/farabi/claims/actions/workflows/mock.yml/dispatches"
        );
    }

    #[test]
    fn test_blank_required_value_is_a_config_error() {
        let mut args = parse(&[]);
        args.gh_owner = " ".to_string();
        assert!(matches!(
            args.relay_config(),
            Err(RelayError::Configuration { .. })
        ));
    }

    #[test]
    fn test_command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
