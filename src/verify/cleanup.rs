//! Post-processing passes that make a raw diff readable.

use std::mem;

use super::diff::{common_prefix, common_suffix, to_diffs, to_edits, Diff, Edit, Operation};

/// Reorders and merges like edit sections, and factors out commonalities
pub fn cleanup_merge_diffs(diffs: &mut Vec<Diff>) {
    let mut edits = to_edits(diffs);
    cleanup_merge(&mut edits);
    *diffs = to_diffs(edits);
}

/// Trades a minimal diff for fewer, larger, human-meaningful chunks
///
/// Small equalities sandwiched between edits are folded into the edits, edit
/// boundaries are slid onto word and line breaks, and deletions overlapping
/// the following insertion are split around the overlap.
pub fn cleanup_semantic(diffs: &mut Vec<Diff>) {
    let mut edits = to_edits(diffs);
    cleanup_semantic_edits(&mut edits);
    *diffs = to_diffs(edits);
}

pub(crate) fn cleanup_semantic_edits(edits: &mut Vec<Edit>) {
    let mut changes = false;
    // Indexes of equalities that are candidates for elimination
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<char>> = None;
    let mut pointer: isize = 0;
    // Edit sizes before and after the last equality
    let mut length_insertions1 = 0;
    let mut length_deletions1 = 0;
    let mut length_insertions2 = 0;
    let mut length_deletions2 = 0;

    while (pointer as usize) < edits.len() {
        let index = pointer as usize;
        if edits[index].op == Operation::Equal {
            equalities.push(index);
            length_insertions1 = length_insertions2;
            length_deletions1 = length_deletions2;
            length_insertions2 = 0;
            length_deletions2 = 0;
            last_equality = Some(edits[index].text.clone());
        } else {
            if edits[index].op == Operation::Insert {
                length_insertions2 += edits[index].text.len();
            } else {
                length_deletions2 += edits[index].text.len();
            }

            let eliminate = match &last_equality {
                Some(equality) => {
                    !equality.is_empty()
                        && equality.len() <= length_insertions1.max(length_deletions1)
                        && equality.len() <= length_insertions2.max(length_deletions2)
                }
                None => false,
            };
            let equality_index = equalities.last().copied();
            if let (true, Some(equality_index)) = (eliminate, equality_index) {
                let equality = last_equality.take().unwrap_or_default();
                // Replace the equality by a deletion and an insertion of its text
                edits.insert(equality_index, Edit::new(Operation::Delete, &equality));
                edits[equality_index + 1].op = Operation::Insert;
                // The eliminated equality, then the one before it, which needs a re-check
                equalities.pop();
                equalities.pop();
                pointer = equalities.last().map_or(-1, |&index| index as isize);
                length_insertions1 = 0;
                length_deletions1 = 0;
                length_insertions2 = 0;
                length_deletions2 = 0;
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(edits);
    }
    cleanup_semantic_lossless(edits);
    extract_overlaps(edits);
}

/// Splits `<del>abcxxx</del><ins>xxxdef</ins>` into `<del>abc</del>xxx<ins>def</ins>`
///
/// Only done when the overlap is at least half as long as one of the edits.
fn extract_overlaps(edits: &mut Vec<Edit>) {
    let mut pointer = 1;
    while pointer < edits.len() {
        if edits[pointer - 1].op == Operation::Delete && edits[pointer].op == Operation::Insert {
            let deletion = edits[pointer - 1].text.clone();
            let insertion = edits[pointer].text.clone();
            let overlap1 = common_overlap(&deletion, &insertion);
            let overlap2 = common_overlap(&insertion, &deletion);

            if overlap1 >= overlap2 {
                if overlap1 * 2 >= deletion.len() || overlap1 * 2 >= insertion.len() {
                    edits.insert(pointer, Edit::new(Operation::Equal, &insertion[..overlap1]));
                    edits[pointer - 1].text = deletion[..deletion.len() - overlap1].to_vec();
                    edits[pointer + 1].text = insertion[overlap1..].to_vec();
                    pointer += 1;
                }
            } else if overlap2 * 2 >= deletion.len() || overlap2 * 2 >= insertion.len() {
                // Reverse overlap; the edits swap places around the equality
                edits.insert(pointer, Edit::new(Operation::Equal, &deletion[..overlap2]));
                edits[pointer - 1] = Edit::new(
                    Operation::Insert,
                    &insertion[..insertion.len() - overlap2],
                );
                edits[pointer + 1] = Edit::new(Operation::Delete, &deletion[overlap2..]);
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Slides single edits surrounded by equalities onto the most natural boundary
pub(crate) fn cleanup_semantic_lossless(edits: &mut Vec<Edit>) {
    let mut pointer: isize = 1;

    while (pointer as usize) + 1 < edits.len() {
        let index = pointer as usize;
        if edits[index - 1].op == Operation::Equal && edits[index + 1].op == Operation::Equal {
            let mut equality1 = edits[index - 1].text.clone();
            let mut edit = edits[index].text.clone();
            let mut equality2 = edits[index + 1].text.clone();

            // First shift the edit as far left as possible
            let offset = common_suffix(&equality1, &edit);
            if offset > 0 {
                let common = edit[edit.len() - offset..].to_vec();
                equality1.truncate(equality1.len() - offset);
                edit = [common.as_slice(), &edit[..edit.len() - offset]].concat();
                equality2 = [common.as_slice(), equality2.as_slice()].concat();
            }

            // Then step right one char at a time, keeping the best scoring split
            let mut best_equality1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_equality2 = equality2.clone();
            let mut best_score =
                semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);

            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                equality1.push(edit.remove(0));
                edit.push(equality2.remove(0));
                let score = semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
                // >= favours the rightmost of equally good splits
                if score >= best_score {
                    best_score = score;
                    best_equality1 = equality1.clone();
                    best_edit = edit.clone();
                    best_equality2 = equality2.clone();
                }
            }

            if edits[index - 1].text != best_equality1 {
                let mut index = index;
                if best_equality1.is_empty() {
                    edits.remove(index - 1);
                    index -= 1;
                    pointer -= 1;
                } else {
                    edits[index - 1].text = best_equality1;
                }
                edits[index].text = best_edit;
                if best_equality2.is_empty() {
                    edits.remove(index + 1);
                    pointer -= 1;
                } else {
                    edits[index + 1].text = best_equality2;
                }
            }
        }
        pointer = (pointer + 1).max(1);
    }
}

/// Scores how natural a boundary between `one` and `two` is, from 6 (best) to 0
fn semantic_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&char1), Some(&char2)) = (one.last(), two.first()) else {
        // Edges are the best possible boundary
        return 6;
    };

    let non_alphanumeric1 = !char1.is_ascii_alphanumeric();
    let non_alphanumeric2 = !char2.is_ascii_alphanumeric();
    let whitespace1 = non_alphanumeric1 && char1.is_whitespace();
    let whitespace2 = non_alphanumeric2 && char2.is_whitespace();
    let line_break1 = whitespace1 && (char1 == '\r' || char1 == '\n');
    let line_break2 = whitespace2 && (char2 == '\r' || char2 == '\n');
    let blank_line1 = line_break1 && (one.ends_with(&['\n', '\n']) || one.ends_with(&['\n', '\r', '\n']));
    let blank_line2 = line_break2
        && [
            &['\n', '\n'][..],
            &['\r', '\n', '\n'][..],
            &['\n', '\r', '\n'][..],
            &['\r', '\n', '\r', '\n'][..],
        ]
        .iter()
        .any(|prefix| two.starts_with(prefix));

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alphanumeric1 && !whitespace1 && whitespace2 {
        // End of sentence
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alphanumeric1 || non_alphanumeric2 {
        1
    } else {
        0
    }
}

/// Length of the longest suffix of `text1` that is a prefix of `text2`
fn common_overlap(text1: &[char], text2: &[char]) -> usize {
    let text_length = text1.len().min(text2.len());
    if text_length == 0 {
        return 0;
    }
    let text1 = &text1[text1.len() - text_length..];
    let text2 = &text2[..text_length];

    // Prefix function of text2, then text1 is run through it
    let mut failure = vec![0; text_length];
    let mut k = 0;
    for i in 1..text_length {
        while k > 0 && text2[i] != text2[k] {
            k = failure[k - 1];
        }
        if text2[i] == text2[k] {
            k += 1;
        }
        failure[i] = k;
    }

    let mut matched = 0;
    for &c in text1 {
        while matched > 0 && (matched == text_length || text2[matched] != c) {
            matched = failure[matched - 1];
        }
        if text2[matched] == c {
            matched += 1;
        }
    }

    matched
}

/// Merges adjacent edits of the same kind and factors out shared affixes
pub(crate) fn cleanup_merge(edits: &mut Vec<Edit>) {
    // Sentinel equality flushes the trailing run
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
                pointer += 1;
            }
            Operation::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(&edits[pointer].text);
                pointer += 1;
            }
            Operation::Equal => {
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let prefix_length = common_prefix(&text_insert, &text_delete);
                        if prefix_length != 0 {
                            let run_start = pointer - count_delete - count_insert;
                            if run_start > 0 && edits[run_start - 1].op == Operation::Equal {
                                edits[run_start - 1]
                                    .text
                                    .extend_from_slice(&text_insert[..prefix_length]);
                            } else {
                                edits.insert(
                                    0,
                                    Edit::new(Operation::Equal, &text_insert[..prefix_length]),
                                );
                                pointer += 1;
                            }
                            text_insert.drain(..prefix_length);
                            text_delete.drain(..prefix_length);
                        }

                        let suffix_length = common_suffix(&text_insert, &text_delete);
                        if suffix_length != 0 {
                            let suffix = &text_insert[text_insert.len() - suffix_length..];
                            let merged = [suffix, edits[pointer].text.as_slice()].concat();
                            edits[pointer].text = merged;
                            text_insert.truncate(text_insert.len() - suffix_length);
                            text_delete.truncate(text_delete.len() - suffix_length);
                        }
                    }

                    let run_start = pointer - count_delete - count_insert;
                    let mut merged = Vec::new();
                    if !text_delete.is_empty() {
                        merged.push(Edit::new(Operation::Delete, &text_delete));
                    }
                    if !text_insert.is_empty() {
                        merged.push(Edit::new(Operation::Insert, &text_insert));
                    }
                    let merged_len = merged.len();
                    edits.splice(run_start..pointer, merged);
                    pointer = run_start + merged_len + 1;
                } else if pointer != 0 && edits[pointer - 1].op == Operation::Equal {
                    let text = mem::take(&mut edits[pointer].text);
                    edits[pointer - 1].text.extend(text);
                    edits.remove(pointer);
                } else {
                    pointer += 1;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }

    if edits.last().is_some_and(|edit| edit.text.is_empty()) {
        edits.pop();
    }

    // Second pass: slide single edits over a neighbouring equality they end
    // or start with, e.g. A<ins>BA</ins>C -> <ins>AB</ins>AC
    let mut changes = false;
    let mut pointer = 1;
    while pointer + 1 < edits.len() {
        if edits[pointer - 1].op == Operation::Equal && edits[pointer + 1].op == Operation::Equal {
            let previous = edits[pointer - 1].text.clone();
            let current = edits[pointer].text.clone();
            let next = edits[pointer + 1].text.clone();

            if current.ends_with(&previous) {
                edits[pointer].text =
                    [previous.as_slice(), &current[..current.len() - previous.len()]].concat();
                edits[pointer + 1].text = [previous.as_slice(), next.as_slice()].concat();
                edits.remove(pointer - 1);
                changes = true;
            } else if current.starts_with(&next) {
                edits[pointer - 1].text.extend_from_slice(&next);
                edits[pointer].text = [&current[next.len()..], next.as_slice()].concat();
                edits.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(edits);
    }
}
