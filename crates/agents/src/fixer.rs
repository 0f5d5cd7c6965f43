//! Prompt construction for the fixer agent.

use autofix_core::IssueContext;

use crate::prompts::INSTRUCTION_PREAMBLE;

/// Most affected files included in the codebase-context block.
pub const MAX_CONTEXT_FILES: usize = 5;
/// Per-file content cap; longer files are cut and marked as truncated.
pub const MAX_FILE_CHARS: usize = 5_000;
/// Most stack frames rendered in the issue block.
pub const MAX_STACK_FRAMES: usize = 15;

/// Content of one affected file, as gathered from the local codebase.
/// `content` is `None` when the file could not be read.
#[derive(Debug, Clone)]
pub struct GatheredFile {
    pub path: String,
    pub content: Option<String>,
}

/// Builds the analysis prompt for one issue.
pub struct FixerAgent<'a> {
    context: &'a IssueContext,
    files: &'a [GatheredFile],
}

impl<'a> FixerAgent<'a> {
    pub fn new(context: &'a IssueContext, files: &'a [GatheredFile]) -> Self {
        Self { context, files }
    }

    /// Render the full prompt: preamble, issue information, codebase context.
    pub fn build_prompt(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(INSTRUCTION_PREAMBLE);
        prompt.push_str("\n---\n\n");
        prompt.push_str(&self.issue_block());
        prompt.push('\n');
        prompt.push_str(&self.codebase_block());

        prompt
    }

    /// Issue title, error detail, and the stacktrace innermost-first.
    fn issue_block(&self) -> String {
        let ctx = self.context;
        let mut out = String::new();

        out.push_str("## Issue Information\n\n");
        out.push_str(&format!("**Title**: {}\n", ctx.issue.title));
        out.push_str(&format!("**Error Type**: {}\n", ctx.error_type));
        out.push_str(&format!("**Error Message**: {}\n", ctx.error_message));
        out.push_str(&format!("**Occurrences**: {}\n", ctx.issue.count));
        out.push_str(&format!("**Link**: {}\n", ctx.issue.permalink));

        if let Some(trace) = &ctx.stacktrace {
            out.push_str("\n### Stacktrace (innermost first)\n\n");

            for frame in trace.frames.iter().rev().take(MAX_STACK_FRAMES) {
                let file = frame
                    .filename
                    .as_deref()
                    .or(frame.abs_path.as_deref())
                    .unwrap_or("?");
                let function = frame.function.as_deref().unwrap_or("?");
                let line = frame
                    .line_no
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".into());
                let col = frame
                    .col_no
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".into());

                out.push_str(&format!("{} in {} at {}:{}\n", file, function, line, col));

                for (num, code) in &frame.context {
                    let marker = if Some(*num) == frame.line_no { ">" } else { " " };
                    out.push_str(&format!("  {} {:4} | {}\n", marker, num, code));
                }
                out.push('\n');
            }
        }

        out
    }

    /// Source of the affected files, truncated per file.
    fn codebase_block(&self) -> String {
        let mut out = String::new();
        out.push_str("## Codebase Context\n\n");

        if self.files.is_empty() {
            out.push_str("_No source files were located for this issue._\n");
            return out;
        }

        for file in self.files.iter().take(MAX_CONTEXT_FILES) {
            out.push_str(&format!("### {}\n\n", file.path));
            match &file.content {
                Some(content) => {
                    out.push_str("```\n");
                    out.push_str(&truncate_content(content, MAX_FILE_CHARS));
                    out.push_str("\n```\n\n");
                }
                None => {
                    out.push_str("_File could not be located in the codebase._\n\n");
                }
            }
        }

        out
    }
}

/// Keep the first `max_chars` characters and append a marker when content
/// was cut.
fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\n... (truncated)", &content[..idx]),
        None => content.to_string(),
    }
}
