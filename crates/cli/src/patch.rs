//! Experimental patch application and PR creation.
//!
//! Whole-file replacement: each proposed change's code block is written as
//! the complete content of the target file, on a dedicated branch, and a
//! pull request is opened with `gh`. The output is a reviewable PR, never an
//! authoritative merge; reviewing the diff is the caller's responsibility.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use autofix_core::{FixProposal, Issue, ProposedChange};

use crate::config::Config;

/// Apply the proposal's code changes and open a pull request. On any
/// failure the working copy is returned to the base branch and the fix
/// branch is deleted before the error propagates.
pub fn apply_and_open_pr(config: &Config, issue: &Issue, proposal: &FixProposal) -> Result<()> {
    let changes: Vec<&ProposedChange> = proposal
        .proposed_changes
        .iter()
        .filter(|c| c.code.is_some())
        .collect();

    if changes.is_empty() {
        info!(issue = %issue.short_id, "Proposal has no code changes; skipping PR creation");
        return Ok(());
    }

    let repo = config.codebase_root.as_path();
    let branch = branch_name(&issue.short_id);

    git(repo, &["checkout", &config.base_branch])?;
    git(repo, &["checkout", "-b", &branch])?;

    if let Err(err) = apply_and_push(config, issue, proposal, &changes, &branch) {
        cleanup(repo, &config.base_branch, &branch);
        return Err(err);
    }

    info!(issue = %issue.short_id, branch = %branch, "Opened pull request");
    Ok(())
}

fn apply_and_push(
    config: &Config,
    issue: &Issue,
    proposal: &FixProposal,
    changes: &[&ProposedChange],
    branch: &str,
) -> Result<()> {
    let repo = config.codebase_root.as_path();

    for change in changes {
        let Some(code) = &change.code else { continue };
        let target = repo.join(&change.file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, code).with_context(|| format!("Failed to write {}", target.display()))?;
        info!(file = %change.file, "Wrote proposed file content");
    }

    git(repo, &["add", "-A"])?;
    git(repo, &["commit", "-m", &commit_message(issue)])?;
    git(repo, &["push", "origin", "HEAD"])?;

    let title = pr_title(issue);
    let body = pr_body(issue, proposal);
    let status = Command::new("gh")
        .args(["pr", "create", "--base", config.base_branch.as_str()])
        .args(["--head", branch])
        .args(["--title", title.as_str()])
        .args(["--body", body.as_str()])
        .current_dir(repo)
        .status()
        .context("Failed to run gh pr create")?;

    if !status.success() {
        bail!("gh pr create failed with status {status}");
    }

    Ok(())
}

/// Best-effort return to the base branch and removal of the fix branch.
fn cleanup(repo: &Path, base_branch: &str, branch: &str) {
    warn!(branch = %branch, "Cleaning up after failed PR creation");

    if let Err(err) = git(repo, &["checkout", base_branch]) {
        warn!(error = %err, "Failed to return to base branch");
    }
    if let Err(err) = git(repo, &["branch", "-D", branch]) {
        warn!(error = %err, "Failed to delete fix branch");
    }
}

fn git(repo: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new("git")
        .args(args)
        .current_dir(repo)
        .status()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !status.success() {
        bail!("git {} failed with status {}", args.join(" "), status);
    }

    Ok(())
}

fn branch_name(short_id: &str) -> String {
    format!("autofix/{}", short_id.to_lowercase())
}

fn commit_message(issue: &Issue) -> String {
    format!(
        "fix: {} - {}\n\nResolves {}",
        issue.short_id, issue.title, issue.permalink
    )
}

fn pr_title(issue: &Issue) -> String {
    format!("fix: {} - {}", issue.short_id, issue.title)
}

fn pr_body(issue: &Issue, proposal: &FixProposal) -> String {
    format!(
        "## Summary\n\n\
         Automated fix proposal for Sentry issue {}: {}\n\n\
         ## Analysis\n\n{}\n\n\
         ## Sentry Issue\n\n{}\n\n\
         ---\n\
         This change was generated automatically and replaces each touched file \
         wholesale. Review the diff carefully before merging.",
        issue.short_id, issue.title, proposal.analysis, issue.permalink
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use autofix_core::Confidence;

    fn make_issue() -> Issue {
        serde_json::from_value(serde_json::json!({
            "id": "12345",
            "shortId": "WEB-123",
            "title": "TypeError: x is undefined",
            "permalink": "https://sentry.io/organizations/acme/issues/12345/",
            "status": "unresolved",
            "firstSeen": "2025-01-01T00:00:00Z",
            "lastSeen": "2025-01-02T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_branch_name() {
        assert_eq!(branch_name("WEB-123"), "autofix/web-123");
    }

    #[test]
    fn test_commit_message() {
        let message = commit_message(&make_issue());
        assert!(message.starts_with("fix: WEB-123 - TypeError"));
        assert!(message.contains("Resolves https://sentry.io/organizations/acme/issues/12345/"));
    }

    #[test]
    fn test_pr_body() {
        let proposal = FixProposal {
            issue_id: "12345".into(),
            analysis: "Root cause here.".into(),
            proposed_changes: vec![],
            confidence: Confidence::Medium,
        };

        let body = pr_body(&make_issue(), &proposal);
        assert!(body.contains("Root cause here."));
        assert!(body.contains("Review the diff carefully"));
    }
}
