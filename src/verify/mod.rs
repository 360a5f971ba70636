//! # Change verification
//!
//! Diffs the rewritten document against the original so the user can audit
//! what the scanner touched:
//!
//! - `diff` - time-bounded Myers diff over chars, with a line-level pre-pass
//! - `cleanup` - merging and semantic cleanup of raw diffs
//! - `report` - human-readable "context [change] context" trace
//!
//! Both texts are normalized first (every line trimmed) so that indentation
//! alone never shows up as a change.

pub mod cleanup;
pub mod diff;
pub mod report;

use std::time::{Duration, Instant};

pub use cleanup::{cleanup_merge_diffs, cleanup_semantic};
pub use diff::{diff_main, Diff, Operation};
pub use report::{pretty_print_diff, ReportStyle, CONTEXT_WIDTH, MIN_SIGNIFICANT_LENGTH};

/// Default wall-clock budget of one diff
pub const DEFAULT_DIFF_TIMEOUT: Duration = Duration::from_secs(1);

/// Trims every line and joins them back together
pub fn normalize(text: &str) -> String {
    text.split('\n').map(str::trim).collect::<Vec<&str>>().join("\n")
}

/// Normalizes both documents and diffs them within `timeout`
pub fn compute_changes(original: &str, transformed: &str, timeout: Duration) -> Vec<Diff> {
    let deadline = Instant::now().checked_add(timeout);
    let mut diffs = diff_main(&normalize(original), &normalize(transformed), deadline);
    cleanup_semantic(&mut diffs);
    diffs
}

/// Text of the first document, rebuilt from a diff
pub fn source_text(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .filter(|diff| diff.operation != Operation::Insert)
        .map(|diff| diff.text.as_str())
        .collect()
}

/// Text of the second document, rebuilt from a diff
pub fn target_text(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .filter(|diff| diff.operation != Operation::Delete)
        .map(|diff| diff.text.as_str())
        .collect()
}

/// Size of a diff, in chars
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangeStats {
    pub unchanged: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl ChangeStats {
    pub fn from_diffs(diffs: &[Diff]) -> Self {
        let mut stats = ChangeStats::default();
        for diff in diffs {
            let length = diff.text.chars().count();
            match diff.operation {
                Operation::Equal => stats.unchanged += length,
                Operation::Insert => stats.inserted += length,
                Operation::Delete => stats.deleted += length,
            }
        }
        stats
    }

    /// Share of the original text that made it into the output unchanged
    pub fn retained_ratio(&self) -> f64 {
        let original = self.unchanged + self.deleted;
        if original == 0 {
            return 1.0;
        }
        self.unchanged as f64 / original as f64
    }
}
