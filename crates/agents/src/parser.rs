//! Model-reply parsing.
//!
//! Turns the free-form text reply into a [`FixProposal`]. The reply format
//! is requested by the prompt but never guaranteed, so this parser is total:
//! any input, including empty or completely off-format text, yields a valid
//! (possibly degenerate) proposal. Missing pieces degrade to defaults: the
//! whole reply becomes the analysis, the change list goes empty, and
//! confidence falls back to medium.

use tracing::debug;

use autofix_core::{Confidence, FixProposal, ProposedChange};

/// Parse a raw model reply into a structured proposal. Never fails.
pub fn parse_response(issue_id: &str, text: &str) -> FixProposal {
    let lines: Vec<&str> = text.lines().collect();

    let analysis_idx = find_heading(&lines, "analysis");
    if analysis_idx.is_none() {
        debug!(issue = %issue_id, "Reply has no analysis heading; keeping the full text");
    }
    let changes_idx = find_heading(&lines, "proposed changes");
    let confidence_idx = find_heading(&lines, "confidence");

    let analysis = match analysis_idx {
        Some(start) => {
            let end = changes_idx.filter(|&i| i > start).unwrap_or(lines.len());
            lines[start + 1..end].join("\n").trim().to_string()
        }
        // Off-format reply: treat the whole text as analysis.
        None => text.trim().to_string(),
    };

    let proposed_changes = match changes_idx {
        Some(start) => {
            let end = confidence_idx.filter(|&i| i > start).unwrap_or(lines.len());
            parse_changes(&lines[start + 1..end])
        }
        None => Vec::new(),
    };

    let confidence = confidence_idx
        .map(|idx| parse_confidence(&lines, idx))
        .unwrap_or_default();

    FixProposal {
        issue_id: issue_id.to_string(),
        analysis,
        proposed_changes,
        confidence,
    }
}

/// Text of a markdown heading line (`## Foo` → `Foo`), any level.
fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.trim_start_matches('#').trim())
}

/// Index of the first heading whose text starts with `name`, case-insensitive.
/// Lines inside fenced code blocks are content, never headings.
fn find_heading(lines: &[&str], name: &str) -> Option<usize> {
    let mut in_fence = false;
    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence
            && let Some(text) = heading_text(line)
            && text.to_lowercase().starts_with(name)
        {
            return Some(i);
        }
    }
    None
}

/// Split the proposed-changes section at file headings and parse each
/// subsection. Heading lines inside fenced code (Python/shell comments,
/// shebangs, C preprocessor lines) do not start a new subsection.
/// Subsections without a usable file path are dropped.
fn parse_changes(section: &[&str]) -> Vec<ProposedChange> {
    let mut heading_indices = Vec::new();
    let mut in_fence = false;
    for (i, line) in section.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence && heading_text(line).is_some() {
            heading_indices.push(i);
        }
    }

    let mut changes = Vec::new();
    for (n, &start) in heading_indices.iter().enumerate() {
        let end = heading_indices
            .get(n + 1)
            .copied()
            .unwrap_or(section.len());

        let Some(file) = extract_file_path(section[start]) else {
            continue;
        };
        let body = &section[start + 1..end];

        changes.push(ProposedChange {
            file,
            description: extract_description(body),
            code: extract_code_block(body),
        });
    }

    changes
}

/// File path from a subsection heading. Accepts an optional `File:` label
/// and strips backtick/bold markers.
fn extract_file_path(line: &str) -> Option<String> {
    let text = strip_file_label(heading_text(line)?);
    let cleaned = text
        .trim_matches(|c: char| c == '`' || c == '*' || c.is_whitespace())
        .to_string();

    if cleaned.is_empty() { None } else { Some(cleaned) }
}

fn strip_file_label(text: &str) -> &str {
    if let Some(prefix) = text.get(..4)
        && prefix.eq_ignore_ascii_case("file")
    {
        let rest = text[4..].trim_start();
        if let Some(stripped) = rest.strip_prefix(':') {
            return stripped.trim_start();
        }
    }
    text
}

/// Description for one subsection: a labelled `Description` field when
/// present, otherwise the free text between the heading and the first code
/// fence.
fn extract_description(body: &[&str]) -> String {
    for line in body {
        if let Some(value) = description_label_value(line)
            && !value.is_empty()
        {
            return value.to_string();
        }
    }

    body.iter()
        .take_while(|line| !is_fence(line))
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Value of a `Description: ...` / `**Description**: ...` line.
fn description_label_value(line: &str) -> Option<&str> {
    let t = line.trim_start().trim_start_matches(['*', '_']).trim_start();
    if !t.get(..11)?.eq_ignore_ascii_case("description") {
        return None;
    }

    let rest = t[11..].trim_start_matches(['*', '_']).trim_start();
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    Some(rest.trim())
}

/// Content of the first fenced code block, fences and language tag removed.
/// An unterminated fence runs to the end of the subsection.
fn extract_code_block(body: &[&str]) -> Option<String> {
    let open = body.iter().position(|line| is_fence(line))?;
    let close = body[open + 1..]
        .iter()
        .position(|line| is_fence(line))
        .map(|i| open + 1 + i)
        .unwrap_or(body.len());

    Some(body[open + 1..close].join("\n"))
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Confidence label from the text following the confidence heading: the
/// earliest case-insensitive occurrence of high/medium/low wins.
fn parse_confidence(lines: &[&str], heading_idx: usize) -> Confidence {
    let mut section = String::new();

    // A label on the heading line itself ("## Confidence: high") counts too.
    if let Some(tail) = heading_text(lines[heading_idx]) {
        let tail = tail.to_lowercase();
        section.push_str(tail.strip_prefix("confidence").unwrap_or(&tail));
        section.push('\n');
    }
    section.push_str(&lines[heading_idx + 1..].join("\n").to_lowercase());

    let found = [
        (section.find("high"), Confidence::High),
        (section.find("medium"), Confidence::Medium),
        (section.find("low"), Confidence::Low),
    ];

    found
        .into_iter()
        .filter_map(|(idx, level)| idx.map(|i| (i, level)))
        .min_by_key(|(i, _)| *i)
        .map(|(_, level)| level)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_reply() {
        let reply = "## Analysis\nBug.\n## Proposed Changes\n### File: x.ts\n**Description**: fix it\n```\nconst x=1;\n```\n## Confidence\nhigh - clear";

        let proposal = parse_response("12345", reply);
        assert_eq!(proposal.issue_id, "12345");
        assert_eq!(proposal.analysis, "Bug.");
        assert_eq!(proposal.proposed_changes.len(), 1);
        assert_eq!(proposal.proposed_changes[0].file, "x.ts");
        assert_eq!(proposal.proposed_changes[0].description, "fix it");
        assert_eq!(proposal.proposed_changes[0].code.as_deref(), Some("const x=1;"));
        assert_eq!(proposal.confidence, Confidence::High);
    }

    #[test]
    fn test_multiple_file_sections_in_order() {
        let reply = "\
## Analysis
Two files are involved.

## Proposed Changes

### File: src/a.ts
**Description**: guard the lookup
```ts
if (!x) return;
```

### src/b.ts
Adjust the caller to handle the early return.

### File: src/c.ts
**Description**: no code needed here

## Confidence
medium - plausible";

        let proposal = parse_response("1", reply);
        let files: Vec<&str> = proposal
            .proposed_changes
            .iter()
            .map(|c| c.file.as_str())
            .collect();
        assert_eq!(files, vec!["src/a.ts", "src/b.ts", "src/c.ts"]);

        assert_eq!(proposal.proposed_changes[0].code.as_deref(), Some("if (!x) return;"));
        assert_eq!(
            proposal.proposed_changes[1].description,
            "Adjust the caller to handle the early return."
        );
        assert!(proposal.proposed_changes[1].code.is_none());
        assert!(proposal.proposed_changes[2].code.is_none());
        assert_eq!(proposal.confidence, Confidence::Medium);
    }

    #[test]
    fn test_no_headings_at_all() {
        let reply = "I think the null check is missing but I cannot tell where.";

        let proposal = parse_response("1", reply);
        assert_eq!(proposal.analysis, reply);
        assert!(proposal.proposed_changes.is_empty());
        assert_eq!(proposal.confidence, Confidence::Medium);
    }

    #[test]
    fn test_empty_input() {
        let proposal = parse_response("1", "");
        assert_eq!(proposal.analysis, "");
        assert!(proposal.proposed_changes.is_empty());
        assert_eq!(proposal.confidence, Confidence::Medium);
    }

    #[test]
    fn test_arbitrary_text_never_panics() {
        for text in [
            "```",
            "```\nunclosed fence",
            "### \n\n```",
            "## Proposed Changes\n###\n```\ncode\n```",
            "## Confidence",
            "#",
            "日本語のテキスト ## Analysis",
            "## Analysis\n## Analysis\n## Confidence\n## Confidence",
        ] {
            let proposal = parse_response("1", text);
            assert_eq!(proposal.issue_id, "1");
        }
    }

    #[test]
    fn test_heading_only_subsection_discarded() {
        let reply = "## Proposed Changes\n###\nsome text\n### File: x.ts\nfix";
        let proposal = parse_response("1", reply);
        assert_eq!(proposal.proposed_changes.len(), 1);
        assert_eq!(proposal.proposed_changes[0].file, "x.ts");
    }

    #[test]
    fn test_file_heading_with_backticks() {
        let reply = "## Proposed Changes\n### File: `src/app.py`\nHandle None.";
        let proposal = parse_response("1", reply);
        assert_eq!(proposal.proposed_changes[0].file, "src/app.py");
    }

    #[test]
    fn test_unterminated_fence_runs_to_section_end() {
        let reply = "## Proposed Changes\n### File: x.ts\ndesc\n```\nline one\nline two";
        let proposal = parse_response("1", reply);
        assert_eq!(
            proposal.proposed_changes[0].code.as_deref(),
            Some("line one\nline two")
        );
        assert_eq!(proposal.proposed_changes[0].description, "desc");
    }

    #[test]
    fn test_analysis_without_changes_heading() {
        let reply = "## Analysis\nThe cache is stale after a deploy.";
        let proposal = parse_response("1", reply);
        assert_eq!(proposal.analysis, "The cache is stale after a deploy.");
        assert!(proposal.proposed_changes.is_empty());
    }

    #[test]
    fn test_confidence_variants() {
        let low = "## Confidence\nLOW, the trace is incomplete";
        assert_eq!(parse_response("1", low).confidence, Confidence::Low);

        let inline = "## Confidence: high\n";
        assert_eq!(parse_response("1", inline).confidence, Confidence::High);

        let unrecognized = "## Confidence\nunsure";
        assert_eq!(parse_response("1", unrecognized).confidence, Confidence::Medium);

        let earliest_wins = "## Confidence\nmedium-high given the partial trace";
        assert_eq!(parse_response("1", earliest_wins).confidence, Confidence::Medium);
    }

    #[test]
    fn test_hash_comments_inside_code_are_not_headings() {
        let reply = "## Proposed Changes\n### File: app.py\n**Description**: guard none\n```python\n# validate input\nif x is None:\n    return\n```\n## Confidence\nhigh";

        let proposal = parse_response("1", reply);
        assert_eq!(proposal.proposed_changes.len(), 1);
        assert_eq!(proposal.proposed_changes[0].file, "app.py");
        assert_eq!(proposal.proposed_changes[0].description, "guard none");
        assert_eq!(
            proposal.proposed_changes[0].code.as_deref(),
            Some("# validate input\nif x is None:\n    return")
        );
        assert_eq!(proposal.confidence, Confidence::High);
    }

    #[test]
    fn test_headings_inside_fences_do_not_split_sections() {
        let reply = "## Analysis\nShell quoting bug.\n## Proposed Changes\n### File: install.sh\n```sh\n#!/bin/sh\n# proposed changes\n## confidence\necho done\n```\n### File: run.sh\n```sh\n# high\necho run\n```\n## Confidence\nlow - needs testing";

        let proposal = parse_response("1", reply);
        assert_eq!(proposal.analysis, "Shell quoting bug.");

        let files: Vec<&str> = proposal
            .proposed_changes
            .iter()
            .map(|c| c.file.as_str())
            .collect();
        assert_eq!(files, vec!["install.sh", "run.sh"]);
        assert_eq!(
            proposal.proposed_changes[0].code.as_deref(),
            Some("#!/bin/sh\n# proposed changes\n## confidence\necho done")
        );
        assert_eq!(proposal.proposed_changes[1].code.as_deref(), Some("# high\necho run"));
        assert_eq!(proposal.confidence, Confidence::Low);
    }

    #[test]
    fn test_code_fence_with_language_tag() {
        let reply = "## Proposed Changes\n### File: a.py\n```python\nprint(1)\n```";
        let proposal = parse_response("1", reply);
        assert_eq!(proposal.proposed_changes[0].code.as_deref(), Some("print(1)"));
    }

    #[test]
    fn test_description_label_without_bold() {
        let reply = "## Proposed Changes\n### File: a.py\nDescription: tighten the guard\n```\nx\n```";
        let proposal = parse_response("1", reply);
        assert_eq!(proposal.proposed_changes[0].description, "tighten the guard");
    }
}
