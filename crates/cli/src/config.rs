//! Runtime configuration.

use std::path::PathBuf;

use clap::Args;

/// Immutable configuration for one run. Constructed once at startup from
/// flags and environment and passed by reference into every component;
/// missing required credentials abort before any processing.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Sentry API auth token
    #[arg(long, env = "SENTRY_AUTH_TOKEN")]
    pub sentry_token: String,

    /// Sentry organization slug
    #[arg(long, env = "SENTRY_ORG")]
    pub organization: String,

    /// Sentry project slug
    #[arg(long, env = "SENTRY_PROJECT")]
    pub project: String,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY")]
    pub anthropic_api_key: String,

    /// Local checkout of the monitored codebase
    #[arg(long, env = "CODEBASE_ROOT", default_value = ".")]
    pub codebase_root: PathBuf,

    /// Sentry issue search query
    #[arg(long, default_value = "is:unresolved")]
    pub query: String,

    /// Maximum issues processed per run
    #[arg(long, default_value = "5")]
    pub max_issues: usize,

    /// Post the analysis back to the issue as a comment
    #[arg(long)]
    pub post_comments: bool,

    /// Directory where proposal reports are written
    #[arg(long, default_value = "autofix-reports")]
    pub output_dir: PathBuf,

    /// Experimental: apply proposed code on a branch and open a pull request
    #[arg(long)]
    pub create_prs: bool,

    /// Base branch for pull requests
    #[arg(long, default_value = "main")]
    pub base_branch: String,

    /// Claude model to use
    #[arg(long, env = "AUTOFIX_MODEL", default_value = "claude-sonnet-4-20250514")]
    pub model: String,

    /// Response length cap in tokens
    #[arg(long, default_value = "4096")]
    pub max_tokens: u32,
}
