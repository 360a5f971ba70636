//! Time-bounded Myers diff.
//!
//! The algorithm follows the classic middle-snake bisection, with the usual
//! speedups in front of it: common prefix/suffix trimming, substring
//! detection, half-match splitting, and a line-level pre-pass for long
//! inputs. A deadline caps the running time. Once it passes, whatever
//! sub-problem is still being bisected is reported as one deletion plus one
//! insertion, so the result stays a valid (if coarser) diff.

use std::collections::HashMap;
use std::time::Instant;

use memchr::memmem;

use super::cleanup::{cleanup_merge, cleanup_semantic_edits};

/// Inputs longer than this (in chars, on both sides) get a line-level pre-pass
const LINE_MODE_THRESHOLD: usize = 100;

/// Distinct lines the line-level pre-pass tracks before lumping the rest together
const MAX_LINES: usize = 65_535;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Delete,
    Insert,
    Equal,
}

/// One diff record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diff {
    pub operation: Operation,
    pub text: String,
}

impl Diff {
    pub fn new(operation: Operation, text: impl Into<String>) -> Self {
        Diff {
            operation,
            text: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Diff::new(Operation::Delete, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Diff::new(Operation::Insert, text)
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Diff::new(Operation::Equal, text)
    }
}

/// Working form of a diff record, indexable by char
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Edit {
    pub op: Operation,
    pub text: Vec<char>,
}

impl Edit {
    pub fn new(op: Operation, text: &[char]) -> Self {
        Edit {
            op,
            text: text.to_vec(),
        }
    }

    fn from_diff(diff: &Diff) -> Self {
        Edit {
            op: diff.operation,
            text: diff.text.chars().collect(),
        }
    }

    fn into_diff(self) -> Diff {
        Diff {
            operation: self.op,
            text: self.text.into_iter().collect(),
        }
    }
}

pub(crate) fn to_edits(diffs: &[Diff]) -> Vec<Edit> {
    diffs.iter().map(Edit::from_diff).collect()
}

pub(crate) fn to_diffs(edits: Vec<Edit>) -> Vec<Diff> {
    edits.into_iter().map(Edit::into_diff).collect()
}

/// Computes the differences between two texts
///
/// With a `deadline`, the computation gives up refining once the instant has
/// passed and returns the best diff found so far. Without one it runs until
/// the diff is minimal.
pub fn diff_main(text1: &str, text2: &str, deadline: Option<Instant>) -> Vec<Diff> {
    let text1: Vec<char> = text1.chars().collect();
    let text2: Vec<char> = text2.chars().collect();

    to_diffs(diff_edits(&text1, &text2, true, deadline))
}

pub(crate) fn diff_edits(
    text1: &[char],
    text2: &[char],
    check_lines: bool,
    deadline: Option<Instant>,
) -> Vec<Edit> {
    if text1 == text2 {
        if text1.is_empty() {
            return Vec::new();
        }
        return vec![Edit::new(Operation::Equal, text1)];
    }

    let prefix_length = common_prefix(text1, text2);
    let (prefix, text1) = text1.split_at(prefix_length);
    let text2 = &text2[prefix_length..];

    let suffix_length = common_suffix(text1, text2);
    let (text1, suffix) = text1.split_at(text1.len() - suffix_length);
    let text2 = &text2[..text2.len() - suffix_length];

    let mut edits = Vec::new();
    if !prefix.is_empty() {
        edits.push(Edit::new(Operation::Equal, prefix));
    }
    edits.extend(compute(text1, text2, check_lines, deadline));
    if !suffix.is_empty() {
        edits.push(Edit::new(Operation::Equal, suffix));
    }

    cleanup_merge(&mut edits);
    edits
}

/// Diffs two texts that share no common prefix or suffix
fn compute(
    text1: &[char],
    text2: &[char],
    check_lines: bool,
    deadline: Option<Instant>,
) -> Vec<Edit> {
    if text1.is_empty() {
        return vec![Edit::new(Operation::Insert, text2)];
    }
    if text2.is_empty() {
        return vec![Edit::new(Operation::Delete, text1)];
    }
    if deadline_passed(deadline) {
        return vec![
            Edit::new(Operation::Delete, text1),
            Edit::new(Operation::Insert, text2),
        ];
    }

    let (long_text, short_text) = if text1.len() > text2.len() {
        (text1, text2)
    } else {
        (text2, text1)
    };

    if let Some(i) = find(long_text, short_text, 0) {
        // The shorter text sits inside the longer one
        let op = if text1.len() > text2.len() {
            Operation::Delete
        } else {
            Operation::Insert
        };
        return vec![
            Edit::new(op, &long_text[..i]),
            Edit::new(Operation::Equal, short_text),
            Edit::new(op, &long_text[i + short_text.len()..]),
        ];
    }

    if short_text.len() == 1 {
        // Single char that is not part of the other text
        return vec![
            Edit::new(Operation::Delete, text1),
            Edit::new(Operation::Insert, text2),
        ];
    }

    // Half-match may yield a non-minimal diff, so it is only used when time is bounded
    if deadline.is_some() {
        if let Some(half_match) = half_match(text1, text2, deadline) {
            let mut edits = diff_edits(half_match.text1_a, half_match.text2_a, check_lines, deadline);
            edits.push(Edit::new(Operation::Equal, half_match.common));
            edits.extend(diff_edits(
                half_match.text1_b,
                half_match.text2_b,
                check_lines,
                deadline,
            ));
            return edits;
        }
    }

    if check_lines && text1.len() > LINE_MODE_THRESHOLD && text2.len() > LINE_MODE_THRESHOLD {
        return line_mode(text1, text2, deadline);
    }

    bisect(text1, text2, deadline)
}

/// Diffs line by line first, then re-diffs the replaced blocks char by char
fn line_mode(text1: &[char], text2: &[char], deadline: Option<Instant>) -> Vec<Edit> {
    let (chars1, chars2, lines) = lines_to_chars(text1, text2);

    let mut edits = diff_edits(&chars1, &chars2, false, deadline);
    chars_to_lines(&mut edits, &lines);
    cleanup_semantic_edits(&mut edits);

    // Sentinel equality flushes the last replacement block
    edits.push(Edit::new(Operation::Equal, &[]));

    let mut pointer = 0;
    let mut count_delete = 0;
    let mut count_insert = 0;
    let mut text_delete: Vec<char> = Vec::new();
    let mut text_insert: Vec<char> = Vec::new();

    while pointer < edits.len() {
        match edits[pointer].op {
            Operation::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(&edits[pointer].text);
            }
            Operation::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(&edits[pointer].text);
            }
            Operation::Equal => {
                if count_delete >= 1 && count_insert >= 1 {
                    let start = pointer - count_delete - count_insert;
                    let sub_edits = diff_edits(&text_delete, &text_insert, false, deadline);
                    let sub_len = sub_edits.len();
                    edits.splice(start..pointer, sub_edits);
                    pointer = start + sub_len;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
        pointer += 1;
    }

    if edits.last().is_some_and(|edit| edit.text.is_empty()) {
        edits.pop();
    }

    edits
}

/// Finds the middle snake and splits the problem there
fn bisect(text1: &[char], text2: &[char], deadline: Option<Instant>) -> Vec<Edit> {
    let text1_length = text1.len() as isize;
    let text2_length = text2.len() as isize;
    let max_d = (text1_length + text2_length + 1) / 2;
    let v_offset = max_d;
    let v_length = 2 * max_d;
    // Two spare slots keep the k == d lookups in bounds for tiny inputs
    let mut v1 = vec![-1isize; v_length as usize + 2];
    let mut v2 = vec![-1isize; v_length as usize + 2];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = text1_length - text2_length;
    // With an odd delta the forward path collides with the reverse path
    let front = delta % 2 != 0;

    let mut k1_start = 0;
    let mut k1_end = 0;
    let mut k2_start = 0;
    let mut k2_end = 0;

    for d in 0..max_d {
        if deadline_passed(deadline) {
            break;
        }

        // Forward path
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < text1_length
                && y1 < text2_length
                && text1[x1 as usize] == text2[y1 as usize]
            {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;

            if x1 > text1_length {
                // Ran off the right of the graph
                k1_end += 2;
            } else if y1 > text2_length {
                // Ran off the bottom of the graph
                k1_start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    let x2 = text1_length - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, deadline);
                    }
                }
            }
            k1 += 2;
        }

        // Reverse path
        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < text1_length
                && y2 < text2_length
                && text1[(text1_length - x2 - 1) as usize] == text2[(text2_length - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;

            if x2 > text1_length {
                k2_end += 2;
            } else if y2 > text2_length {
                k2_start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= text1_length - x2 {
                        return bisect_split(text1, text2, x1 as usize, y1 as usize, deadline);
                    }
                }
            }
            k2 += 2;
        }
    }

    // Out of time, or no commonality at all
    vec![
        Edit::new(Operation::Delete, text1),
        Edit::new(Operation::Insert, text2),
    ]
}

fn bisect_split(
    text1: &[char],
    text2: &[char],
    x: usize,
    y: usize,
    deadline: Option<Instant>,
) -> Vec<Edit> {
    let (text1_a, text1_b) = text1.split_at(x);
    let (text2_a, text2_b) = text2.split_at(y);

    let mut edits = diff_edits(text1_a, text2_a, false, deadline);
    edits.extend(diff_edits(text1_b, text2_b, false, deadline));
    edits
}

struct HalfMatch<'a> {
    text1_a: &'a [char],
    text1_b: &'a [char],
    text2_a: &'a [char],
    text2_b: &'a [char],
    common: &'a [char],
}

/// Looks for a common substring at least half as long as the longer text
fn half_match<'a>(
    text1: &'a [char],
    text2: &'a [char],
    deadline: Option<Instant>,
) -> Option<HalfMatch<'a>> {
    let (long_text, short_text) = if text1.len() > text2.len() {
        (text1, text2)
    } else {
        (text2, text1)
    };
    if long_text.len() < 4 || short_text.len() * 2 < long_text.len() {
        return None;
    }

    // Seed the search at the second and the third quarter
    let searchable = SearchText::new(short_text);
    let first_seed = (long_text.len() + 3) / 4;
    let second_seed = (long_text.len() + 1) / 2;
    let first = half_match_at(long_text, short_text, &searchable, first_seed, deadline);
    let second = half_match_at(long_text, short_text, &searchable, second_seed, deadline);

    let best = match (first, second) {
        (None, None) => return None,
        (Some(found), None) | (None, Some(found)) => found,
        (Some(first), Some(second)) => {
            if first.common.len() > second.common.len() {
                first
            } else {
                second
            }
        }
    };

    // `best` was computed on (long, short); map it back onto (text1, text2)
    if text1.len() > text2.len() {
        Some(best)
    } else {
        Some(HalfMatch {
            text1_a: best.text2_a,
            text1_b: best.text2_b,
            text2_a: best.text1_a,
            text2_b: best.text1_b,
            common: best.common,
        })
    }
}

/// Half-match seeded with the quarter of `long_text` starting at `i`
fn half_match_at<'a>(
    long_text: &'a [char],
    short_text: &'a [char],
    searchable: &SearchText,
    i: usize,
    deadline: Option<Instant>,
) -> Option<HalfMatch<'a>> {
    let seed: String = long_text[i..i + long_text.len() / 4].iter().collect();
    let seed = memmem::Finder::new(seed.as_bytes());
    let mut best: Option<HalfMatch<'a>> = None;
    let mut best_length = 0;

    let mut j = searchable.find_with(&seed, 0);
    while let Some(found) = j {
        if deadline_passed(deadline) {
            break;
        }
        let prefix_length = common_prefix(&long_text[i..], &short_text[found..]);
        let suffix_length = common_suffix(&long_text[..i], &short_text[..found]);
        if best_length < suffix_length + prefix_length {
            best_length = suffix_length + prefix_length;
            best = Some(HalfMatch {
                text1_a: &long_text[..i - suffix_length],
                text1_b: &long_text[i + prefix_length..],
                text2_a: &short_text[..found - suffix_length],
                text2_b: &short_text[found + prefix_length..],
                common: &short_text[found - suffix_length..found + prefix_length],
            });
        }
        j = searchable.find_with(&seed, found + 1);
    }

    best.filter(|_| best_length * 2 >= long_text.len())
}

/// Encodes every distinct line as one char so lines can be diffed like chars
fn lines_to_chars(text1: &[char], text2: &[char]) -> (Vec<char>, Vec<char>, Vec<Vec<char>>) {
    // Index 0 stays unused so that no line maps to '\0'
    let mut lines: Vec<Vec<char>> = vec![Vec::new()];
    let mut line_index: HashMap<Vec<char>, usize> = HashMap::new();

    let chars1 = encode_lines(text1, &mut lines, &mut line_index);
    let chars2 = encode_lines(text2, &mut lines, &mut line_index);

    (chars1, chars2, lines)
}

fn encode_lines(
    text: &[char],
    lines: &mut Vec<Vec<char>>,
    line_index: &mut HashMap<Vec<char>, usize>,
) -> Vec<char> {
    let mut encoded = Vec::new();
    let mut line_start = 0;

    while line_start < text.len() {
        let mut line_end = match text[line_start..].iter().position(|&c| c == '\n') {
            Some(offset) => line_start + offset + 1,
            None => text.len(),
        };
        if lines.len() == MAX_LINES {
            // Out of distinct lines; treat the remainder as a single line
            line_end = text.len();
        }

        let line = &text[line_start..line_end];
        let index = match line_index.get(line) {
            Some(&index) => index,
            None => {
                lines.push(line.to_vec());
                line_index.insert(line.to_vec(), lines.len() - 1);
                lines.len() - 1
            }
        };
        encoded.push(index_to_char(index));
        line_start = line_end;
    }

    encoded
}

fn chars_to_lines(edits: &mut [Edit], lines: &[Vec<char>]) {
    for edit in edits.iter_mut() {
        let mut text = Vec::new();
        for &c in &edit.text {
            if let Some(line) = lines.get(char_to_index(c)) {
                text.extend_from_slice(line);
            }
        }
        edit.text = text;
    }
}

// Line indexes skip the surrogate range, which has no chars
fn index_to_char(index: usize) -> char {
    let value = index as u32;
    let value = if value < 0xD800 { value } else { value + 0x800 };
    char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn char_to_index(c: char) -> usize {
    let value = c as u32;
    (if value < 0xE000 { value } else { value - 0x800 }) as usize
}

pub(crate) fn common_prefix(text1: &[char], text2: &[char]) -> usize {
    text1
        .iter()
        .zip(text2.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

pub(crate) fn common_suffix(text1: &[char], text2: &[char]) -> usize {
    text1
        .iter()
        .rev()
        .zip(text2.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() > deadline)
}

/// Position of `needle` in `haystack`, searching from `from`
pub(crate) fn find(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    SearchText::new(haystack).find(needle, from)
}

/// UTF-8 copy of a char slice, searched in linear time
pub(crate) struct SearchText {
    utf8: String,
    /// Byte offset of every char, plus the total length
    offsets: Vec<usize>,
}

impl SearchText {
    pub fn new(text: &[char]) -> Self {
        let mut utf8 = String::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for &c in text {
            offsets.push(utf8.len());
            utf8.push(c);
        }
        offsets.push(utf8.len());

        SearchText { utf8, offsets }
    }

    /// Char position of `needle`, searching from char `from`
    pub fn find(&self, needle: &[char], from: usize) -> Option<usize> {
        let needle: String = needle.iter().collect();
        self.find_with(&memmem::Finder::new(needle.as_bytes()), from)
    }

    pub fn find_with(&self, needle: &memmem::Finder<'_>, from: usize) -> Option<usize> {
        let start = *self.offsets.get(from)?;
        let found = needle.find(&self.utf8.as_bytes()[start..])?;
        // A match of valid UTF-8 always starts on a char boundary
        self.offsets.binary_search(&(start + found)).ok()
    }
}
