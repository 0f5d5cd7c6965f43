//! Run coordinator: the sequential per-issue pipeline.
//!
//! Issues are processed strictly one at a time to stay within third-party
//! rate limits. Each issue's pipeline runs to completion or logs its failure
//! and the loop moves on; only configuration problems stop a run.

use std::fs;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use uuid::Uuid;

use autofix_agents::{parse_response, FixerAgent, GatheredFile, MAX_CONTEXT_FILES};
use autofix_claude::ClaudeClient;
use autofix_core::{is_eligible, Error as CoreError, Issue, IssueContext};
use autofix_sentry::SentryClient;

use crate::config::Config;
use crate::patch;
use crate::report;

/// Outcome of one issue's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A proposal was produced and persisted.
    Analyzed,
    /// The issue was filtered out before reaching the model.
    Skipped,
}

/// Aggregated outcomes of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Process up to `max_issues` issues end to end.
pub async fn run(
    config: &Config,
    sentry: &SentryClient,
    claude: &ClaudeClient,
) -> Result<RunSummary> {
    let run_id = Uuid::new_v4();
    info!(
        run_id = %run_id,
        organization = %config.organization,
        project = %config.project,
        "Starting autofix run"
    );

    let issues = sentry
        .list_issues(&config.project, &config.query, config.max_issues)
        .await
        .context("Failed to fetch issue list")?;
    info!(count = issues.len(), "Fetched issues");

    let mut summary = RunSummary::default();
    for issue in issues {
        let short_id = issue.short_id.clone();
        match process_issue(config, sentry, claude, issue).await {
            Ok(IssueOutcome::Analyzed) => summary.analyzed += 1,
            Ok(IssueOutcome::Skipped) => summary.skipped += 1,
            Err(err) => {
                error!(
                    issue = %short_id,
                    error = %err,
                    "Issue processing failed; continuing with next issue"
                );
                summary.failed += 1;
            }
        }
    }

    info!(
        analyzed = summary.analyzed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Run complete"
    );
    Ok(summary)
}

/// Process one specific issue by ID or short ID.
pub async fn run_single(
    config: &Config,
    sentry: &SentryClient,
    claude: &ClaudeClient,
    issue_id: &str,
) -> Result<IssueOutcome> {
    let issue = sentry
        .get_issue(issue_id)
        .await
        .context("Failed to fetch issue")?;
    process_issue(config, sentry, claude, issue).await
}

/// Fetch issues and print their eligibility without invoking the model.
pub async fn list(config: &Config, sentry: &SentryClient) -> Result<()> {
    let issues = sentry
        .list_issues(&config.project, &config.query, config.max_issues)
        .await
        .context("Failed to fetch issue list")?;

    if issues.is_empty() {
        println!("No issues matched '{}'", config.query);
        return Ok(());
    }

    for issue in issues {
        let short_id = issue.short_id.clone();
        let verdict = match sentry.latest_event(&issue.id).await {
            Ok(event) => match IssueContext::build(issue.clone(), event) {
                Ok(ctx) if is_eligible(&ctx) => "eligible",
                Ok(_) => "not eligible",
                Err(CoreError::NoEventData(_)) => "no event data",
            },
            Err(err) => {
                warn!(issue = %short_id, error = %err, "Failed to fetch latest event");
                "fetch failed"
            }
        };

        println!(
            "{:<12} {:>8}  {:<13} {}",
            issue.short_id, issue.count, verdict, issue.title
        );
    }

    Ok(())
}

/// The per-issue pipeline: extract, filter, gather, investigate, persist,
/// then the optional comment and PR side effects.
async fn process_issue(
    config: &Config,
    sentry: &SentryClient,
    claude: &ClaudeClient,
    issue: Issue,
) -> Result<IssueOutcome> {
    let short_id = issue.short_id.clone();
    info!(issue = %short_id, title = %issue.title, "Analyzing issue");

    let event = sentry
        .latest_event(&issue.id)
        .await
        .context("Failed to fetch latest event")?;

    let ctx = match IssueContext::build(issue, event) {
        Ok(ctx) => ctx,
        Err(CoreError::NoEventData(_)) => {
            info!(issue = %short_id, "No event data recorded; skipping");
            return Ok(IssueOutcome::Skipped);
        }
    };

    if !is_eligible(&ctx) {
        info!(issue = %short_id, "Not eligible for auto-fix; skipping");
        return Ok(IssueOutcome::Skipped);
    }

    let files = gather_files(config, &ctx.affected_files);
    info!(
        issue = %short_id,
        files = files.len(),
        located = files.iter().filter(|f| f.content.is_some()).count(),
        "Gathered codebase context"
    );

    let prompt = FixerAgent::new(&ctx, &files).build_prompt();
    info!(issue = %short_id, prompt_len = prompt.len(), "Requesting fix proposal");

    let reply = claude
        .complete(&prompt)
        .await
        .context("Claude completion failed")?;

    let proposal = parse_response(&ctx.issue.id, &reply);
    info!(
        issue = %short_id,
        changes = proposal.proposed_changes.len(),
        confidence = proposal.confidence.as_str(),
        "Parsed fix proposal"
    );

    let paths = report::write_reports(&config.output_dir, &ctx.issue, &proposal)
        .context("Failed to persist proposal")?;
    info!(
        issue = %short_id,
        json = %paths.json.display(),
        markdown = %paths.markdown.display(),
        "Persisted proposal"
    );

    if config.post_comments {
        let body = report::comment_body(&proposal);
        match sentry.post_comment(&ctx.issue.id, &body).await {
            Ok(()) => info!(issue = %short_id, "Posted analysis comment"),
            Err(err) if err.is_permission_denied() => {
                warn!(
                    issue = %short_id,
                    error = %err,
                    "Comment rejected; grant the token the event:write scope to enable comments"
                );
            }
            Err(err) => warn!(issue = %short_id, error = %err, "Failed to post comment"),
        }
    }

    if config.create_prs
        && let Err(err) = patch::apply_and_open_pr(config, &ctx.issue, &proposal)
    {
        warn!(
            issue = %short_id,
            error = %err,
            "PR creation failed; the proposal is still available on disk"
        );
    }

    Ok(IssueOutcome::Analyzed)
}

/// Read the affected files from the local codebase. A file that cannot be
/// read stays in the list with no content so the prompt can note it.
fn gather_files(config: &Config, affected: &[String]) -> Vec<GatheredFile> {
    affected
        .iter()
        .take(MAX_CONTEXT_FILES)
        .map(|path| {
            let full = config.codebase_root.join(path);
            let content = match fs::read_to_string(&full) {
                Ok(content) => Some(content),
                Err(err) => {
                    warn!(file = %full.display(), error = %err, "Could not read affected file");
                    None
                }
            };
            GatheredFile {
                path: path.clone(),
                content,
            }
        })
        .collect()
}
