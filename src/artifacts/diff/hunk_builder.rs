//! Grouping of an edit script into context-framed hunks
//!
//! Changes separated by no more than `2 * context` unchanged lines end up in
//! the same hunk; otherwise a new hunk starts. Each hunk keeps up to `context`
//! unchanged lines on either side as its matching frame.

use crate::artifacts::diff::myers::Edit;
use crate::artifacts::hunk::{Hunk, HunkLine, LineOp};

pub fn build_hunks(a: &[String], b: &[String], edits: &[Edit], context: usize) -> Vec<Hunk> {
    let changes = edits
        .iter()
        .enumerate()
        .filter(|(_, edit)| edit.is_change())
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    let Some(&first_change) = changes.first() else {
        return Vec::new();
    };

    // (old, new) line positions reached before each edit
    let mut positions = Vec::with_capacity(edits.len() + 1);
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for edit in edits {
        positions.push((old_pos, new_pos));
        match edit {
            Edit::Delete { .. } => old_pos += 1,
            Edit::Insert { .. } => new_pos += 1,
            Edit::Equal { .. } => {
                old_pos += 1;
                new_pos += 1;
            }
        }
    }
    positions.push((old_pos, new_pos));

    let mut groups = Vec::new();
    let (mut start, mut end) = (first_change, first_change);
    for &change in &changes[1..] {
        if change - end - 1 > 2 * context {
            groups.push((start, end));
            start = change;
        }
        end = change;
    }
    groups.push((start, end));

    groups
        .into_iter()
        .map(|(first, last)| {
            let lo = first.saturating_sub(context);
            let hi = (last + context + 1).min(edits.len());

            let line_of = |edit: &Edit| match *edit {
                Edit::Delete { old } => HunkLine::new(LineOp::Remove, a[old].clone()),
                Edit::Insert { new } => HunkLine::new(LineOp::Add, b[new].clone()),
                Edit::Equal { old, .. } => HunkLine::new(LineOp::Context, a[old].clone()),
            };

            let context_before = edits[lo..first]
                .iter()
                .map(|edit| line_of(edit).line)
                .collect::<Vec<_>>();
            let changed_lines = edits[first..=last].iter().map(line_of).collect::<Vec<_>>();
            let context_after = edits[last + 1..hi]
                .iter()
                .map(|edit| line_of(edit).line)
                .collect::<Vec<_>>();

            let (old_lo, new_lo) = positions[lo];
            let (old_hi, new_hi) = positions[hi];
            let source_length = old_hi - old_lo;
            let target_length = new_hi - new_lo;

            Hunk {
                source_start: if source_length == 0 { old_lo } else { old_lo + 1 },
                source_length,
                target_start: if target_length == 0 { new_lo } else { new_lo + 1 },
                target_length,
                context_before,
                context_after,
                changed_lines,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::diff::myers::{DiffAlgorithm, MyersDiff};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn lines(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| format!("{v}\n")).collect()
    }

    fn hunks_for(a: &[String], b: &[String], context: usize) -> Vec<Hunk> {
        build_hunks(a, b, &MyersDiff::new(a, b).diff(), context)
    }

    #[test]
    fn single_replacement_gets_one_line_of_context_each_side() {
        let a = lines(&["a", "b", "c"]);
        let b = lines(&["a", "X", "c"]);

        let hunks = hunks_for(&a, &b, 3);

        assert_eq!(
            hunks,
            vec![Hunk {
                source_start: 1,
                source_length: 3,
                target_start: 1,
                target_length: 3,
                context_before: lines(&["a"]),
                context_after: lines(&["c"]),
                changed_lines: vec![HunkLine::remove("b\n"), HunkLine::add("X\n")],
            }]
        );
    }

    #[rstest]
    #[case(1, 2)]
    #[case(3, 1)]
    fn distant_changes_split_into_separate_hunks(#[case] context: usize, #[case] expected: usize) {
        let a = lines(&["1", "2", "3", "4", "5", "6", "7", "8"]);
        let b = lines(&["1", "two", "3", "4", "5", "6", "seven", "8"]);

        let hunks = hunks_for(&a, &b, context);

        assert_eq!(hunks.len(), expected);
        for hunk in &hunks {
            assert!(hunk.check_consistency().is_ok());
        }
    }

    #[test]
    fn merged_hunk_keeps_interior_context() {
        let a = lines(&["1", "2", "3", "4"]);
        let b = lines(&["one", "2", "3", "four"]);

        let hunks = hunks_for(&a, &b, 1);

        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].context_before, Vec::<String>::new());
        assert_eq!(
            hunks[0].changed_lines,
            vec![
                HunkLine::remove("1\n"),
                HunkLine::add("one\n"),
                HunkLine::context("2\n"),
                HunkLine::context("3\n"),
                HunkLine::remove("4\n"),
                HunkLine::add("four\n"),
            ]
        );
    }

    #[test]
    fn insertion_into_empty_file_uses_zero_source_start() {
        let a = Vec::new();
        let b = lines(&["new"]);

        let hunks = hunks_for(&a, &b, 3);

        assert_eq!(hunks[0].header(), "@@ -0,0 +1,1 @@");
    }

    #[test]
    fn identical_inputs_produce_no_hunks() {
        let a = lines(&["same"]);
        assert!(hunks_for(&a, &a, 3).is_empty());
    }
}
