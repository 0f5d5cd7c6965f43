//! Proposal persistence and comment rendering.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use autofix_core::{FixProposal, Issue};

/// Locations of the files written for one proposal.
#[derive(Debug)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// Write the JSON and Markdown reports for one proposal. Writes are not
/// transactional; a crash mid-run can leave partial output.
pub fn write_reports(dir: &Path, issue: &Issue, proposal: &FixProposal) -> Result<ReportPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let now = Utc::now();
    let stem = format!("{}_{}", issue.short_id, now.timestamp_millis());
    let json_path = dir.join(format!("{stem}.json"));
    let markdown_path = dir.join(format!("{stem}.md"));

    let payload = serde_json::json!({
        "issue": {
            "id": issue.id,
            "shortId": issue.short_id,
            "title": issue.title,
            "permalink": issue.permalink,
        },
        "proposal": proposal,
        "timestamp": now.to_rfc3339(),
    });

    fs::write(&json_path, serde_json::to_string_pretty(&payload)?)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;
    fs::write(&markdown_path, render_markdown(issue, proposal, &now))
        .with_context(|| format!("Failed to write {}", markdown_path.display()))?;

    Ok(ReportPaths {
        json: json_path,
        markdown: markdown_path,
    })
}

/// Human-readable rendering of a proposal.
fn render_markdown(issue: &Issue, proposal: &FixProposal, now: &DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Fix proposal: {}\n\n", issue.title));
    out.push_str(&format!("- Issue: [{}]({})\n", issue.short_id, issue.permalink));
    out.push_str(&format!("- Date: {}\n", now.to_rfc3339()));
    out.push_str(&format!("- Confidence: {}\n\n", proposal.confidence.as_str()));

    out.push_str("## Analysis\n\n");
    out.push_str(&proposal.analysis);
    out.push_str("\n\n## Proposed Changes\n\n");

    if proposal.proposed_changes.is_empty() {
        out.push_str("_No changes proposed._\n");
        return out;
    }

    for change in &proposal.proposed_changes {
        out.push_str(&format!("### {}\n\n", change.file));
        out.push_str(&change.description);
        out.push('\n');
        if let Some(code) = &change.code {
            out.push_str("\n```\n");
            out.push_str(code);
            out.push_str("\n```\n");
        }
        out.push('\n');
    }

    out
}

/// Summary comment posted back to the Sentry issue.
pub fn comment_body(proposal: &FixProposal) -> String {
    let mut out = String::new();

    out.push_str("## Automated fix proposal\n\n");
    out.push_str(&proposal.analysis);
    out.push('\n');

    if !proposal.proposed_changes.is_empty() {
        out.push_str("\n**Proposed changes:**\n");
        for change in &proposal.proposed_changes {
            out.push_str(&format!("- `{}`: {}\n", change.file, change.description));
        }
    }

    out.push_str(&format!("\n**Confidence**: {}\n", proposal.confidence.as_str()));
    out.push_str("\n_This analysis was generated automatically. Review it carefully before applying any changes._\n");

    out
}
