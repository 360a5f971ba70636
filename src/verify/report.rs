use super::diff::{Diff, Operation};

/// Chars of surrounding unchanged text shown around each change
pub const CONTEXT_WIDTH: usize = 16;

/// Changes shorter than this after trimming are left out of the report
pub const MIN_SIGNIFICANT_LENGTH: usize = 3;

const ANSI_BOLD_GREEN: &str = "\x1b[1;32m";
const ANSI_BOLD_RED: &str = "\x1b[1;31m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportStyle {
    /// Bold green insertions, bold red deletions
    Ansi,
    /// `{+inserted+}` and `[-deleted-]` markers
    Plain,
}

impl ReportStyle {
    fn paint(self, operation: Operation, text: &str) -> String {
        match (self, operation) {
            (ReportStyle::Ansi, Operation::Insert) => {
                format!("{ANSI_BOLD_GREEN}{text}{ANSI_RESET}")
            }
            (ReportStyle::Ansi, Operation::Delete) => format!("{ANSI_BOLD_RED}{text}{ANSI_RESET}"),
            (ReportStyle::Plain, Operation::Insert) => format!("{{+{text}+}}"),
            (ReportStyle::Plain, Operation::Delete) => format!("[-{text}-]"),
            (_, Operation::Equal) => text.to_string(),
        }
    }
}

/// Renders a diff as an interleaved "context [change] context" trace
///
/// Each run of changes is preceded by the tail of the last unchanged segment
/// and followed by the head of the next one, then a line break. Unchanged
/// text in between is not shown.
pub fn pretty_print_diff(diffs: &[Diff], style: ReportStyle, context_width: usize) -> String {
    let mut report = String::new();
    let mut last_equal = "";
    let mut last_was_diff = false;

    for diff in diffs {
        if diff.text.trim().chars().count() < MIN_SIGNIFICANT_LENGTH {
            continue;
        }

        match diff.operation {
            Operation::Insert | Operation::Delete => {
                if !last_was_diff {
                    report.push_str(tail(last_equal, context_width));
                }
                report.push_str(&style.paint(diff.operation, &diff.text));
                last_was_diff = true;
            }
            Operation::Equal => {
                if last_was_diff {
                    report.push_str(head(&diff.text, context_width));
                    report.push('\n');
                    last_was_diff = false;
                }
                last_equal = &diff.text;
            }
        }
    }

    report
}

fn head(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn tail(text: &str, width: usize) -> &str {
    let count = text.chars().count();
    if count <= width {
        return text;
    }
    match text.char_indices().nth(count - width) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
