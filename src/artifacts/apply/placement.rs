//! Bounded hunk relocation
//!
//! Candidates are visited outward from the expected offset, one distance at a
//! time, so the search never leaves `expected ± radius`. The winner has the
//! fewest mismatched context lines, then the smallest distance. Two winners at
//! the same distance sit on opposite sides of the expected offset and make the
//! placement ambiguous.

use crate::artifacts::apply::conflict::ConflictReason;
use crate::artifacts::hunk::Hunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index in the working buffer where the hunk's core starts
    pub at: usize,
    /// Context mismatches tolerated at that index
    pub fuzz: usize,
}

/// Why a hunk could not be placed and the fuzz level it was judged at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miss {
    pub reason: ConflictReason,
    pub fuzz: usize,
}

pub fn locate(lines: &[String], hunk: &Hunk, expected: usize, max_fuzz: usize, radius: usize) -> Result<Placement, Miss> {
    // (fuzz, distance, at)
    let mut best: Option<(usize, usize, usize)> = None;
    let mut ambiguous = false;

    for distance in 0..=radius {
        if let Some((0, best_distance, _)) = best
            && distance > best_distance
        {
            break;
        }

        let below = expected.checked_sub(distance);
        let above = expected
            .checked_add(distance)
            .filter(|at| distance > 0 && *at <= lines.len());
        if below.is_none() && above.is_none() && expected.saturating_add(distance) > lines.len() {
            break;
        }

        for at in [below, above].into_iter().flatten() {
            let Some(fuzz) = hunk.matches(lines, at, max_fuzz) else {
                continue;
            };

            match best {
                Some((best_fuzz, best_distance, _)) if (best_fuzz, best_distance) < (fuzz, distance) => {}
                Some((best_fuzz, best_distance, _)) if (best_fuzz, best_distance) == (fuzz, distance) => {
                    ambiguous = true;
                }
                _ => {
                    best = Some((fuzz, distance, at));
                    ambiguous = false;
                }
            }
        }
    }

    match best {
        None => Err(Miss {
            reason: ConflictReason::ContextNotFound,
            fuzz: max_fuzz,
        }),
        Some((fuzz, _, _)) if ambiguous => Err(Miss {
            reason: ConflictReason::AmbiguousMatch,
            fuzz,
        }),
        Some((fuzz, _, at)) => Ok(Placement { at, fuzz }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::hunk::HunkLine;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn lines(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| format!("{v}\n")).collect()
    }

    // a, -b +X, c
    #[fixture]
    fn replace_b() -> Hunk {
        Hunk {
            source_start: 1,
            source_length: 3,
            target_start: 1,
            target_length: 3,
            context_before: lines(&["a"]),
            context_after: lines(&["c"]),
            changed_lines: vec![HunkLine::remove("b\n"), HunkLine::add("X\n")],
        }
    }

    #[rstest]
    fn exact_offset_wins(replace_b: Hunk) {
        let file = lines(&["a", "b", "c"]);

        assert_eq!(locate(&file, &replace_b, 1, 0, 3), Ok(Placement { at: 1, fuzz: 0 }));
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    fn finds_shifted_context(replace_b: Hunk, #[case] shift: usize) {
        let mut file = vec!["unrelated\n".to_string(); shift];
        file.extend(lines(&["a", "b", "c"]));

        assert_eq!(
            locate(&file, &replace_b, 1, 0, shift),
            Ok(Placement { at: 1 + shift, fuzz: 0 })
        );
        assert_eq!(
            locate(&file, &replace_b, 1, 0, shift - 1).unwrap_err().reason,
            ConflictReason::ContextNotFound
        );
    }

    #[rstest]
    fn lower_fuzz_beats_nearer_offset(replace_b: Hunk) {
        let file = lines(&["a", "b", "d", "a", "b", "c"]);

        assert_eq!(locate(&file, &replace_b, 1, 1, 6), Ok(Placement { at: 4, fuzz: 0 }));
    }

    #[rstest]
    fn fuzz_admits_mismatched_context(replace_b: Hunk) {
        let file = lines(&["a", "b", "d"]);

        assert_eq!(
            locate(&file, &replace_b, 1, 0, 3),
            Err(Miss {
                reason: ConflictReason::ContextNotFound,
                fuzz: 0
            })
        );
        assert_eq!(locate(&file, &replace_b, 1, 1, 3), Ok(Placement { at: 1, fuzz: 1 }));
    }

    #[test]
    fn equal_matches_on_both_sides_are_ambiguous() {
        let hunk = Hunk {
            source_start: 3,
            source_length: 1,
            target_start: 3,
            target_length: 1,
            context_before: vec![],
            context_after: vec![],
            changed_lines: vec![HunkLine::remove("m\n"), HunkLine::add("M\n")],
        };
        let file = lines(&["a", "m", "q", "m", "a"]);

        assert_eq!(
            locate(&file, &hunk, 2, 0, 5),
            Err(Miss {
                reason: ConflictReason::AmbiguousMatch,
                fuzz: 0
            })
        );
    }

    #[test]
    fn insertion_past_the_end_falls_back_to_the_end() {
        let hunk = Hunk {
            source_start: 5,
            source_length: 0,
            target_start: 6,
            target_length: 1,
            context_before: vec![],
            context_after: vec![],
            changed_lines: vec![HunkLine::add("new\n")],
        };
        let file = lines(&["a", "b"]);

        assert_eq!(locate(&file, &hunk, 5, 0, 3), Ok(Placement { at: 2, fuzz: 0 }));
    }
}
