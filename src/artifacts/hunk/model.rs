use crate::artifacts::hunk::line_op::{HunkLine, LineOp};
use std::fmt::Display;

/// One localized change within a file
///
/// Coordinates follow the unified-diff convention: starts are 1-based, and a
/// zero-length range names the line *after which* the change sits (so `0`
/// means "before the first line").
///
/// `changed_lines` runs from the first to the last added/removed line and may
/// contain interior context when two nearby edits were merged into one hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub source_start: usize,
    pub source_length: usize,
    pub target_start: usize,
    pub target_length: usize,
    pub context_before: Vec<String>,
    pub context_after: Vec<String>,
    pub changed_lines: Vec<HunkLine>,
}

impl Hunk {
    /// Lines the hunk replaces: the source side of `changed_lines`
    pub fn core_source(&self) -> impl Iterator<Item = &String> {
        self.changed_lines
            .iter()
            .filter(|l| l.op.in_source())
            .map(|l| &l.line)
    }

    /// Lines the hunk writes in place of [`Hunk::core_source`]
    pub fn core_target(&self) -> impl Iterator<Item = &String> {
        self.changed_lines
            .iter()
            .filter(|l| l.op.in_target())
            .map(|l| &l.line)
    }

    pub fn core_source_len(&self) -> usize {
        self.changed_lines.iter().filter(|l| l.op.in_source()).count()
    }

    pub fn core_target_len(&self) -> usize {
        self.changed_lines.iter().filter(|l| l.op.in_target()).count()
    }

    /// Source length implied by the hunk's lines
    pub fn counted_source_length(&self) -> usize {
        self.context_before.len() + self.core_source_len() + self.context_after.len()
    }

    /// Target length implied by the hunk's lines
    pub fn counted_target_length(&self) -> usize {
        self.context_before.len() + self.core_target_len() + self.context_after.len()
    }

    /// 0-based index of the first source line the hunk covers
    pub fn source_offset(&self) -> usize {
        if self.source_length == 0 {
            self.source_start
        } else {
            self.source_start.saturating_sub(1)
        }
    }

    /// 0-based source index just past the last covered line
    pub fn source_end(&self) -> usize {
        self.source_offset() + self.source_length
    }

    /// Where the replaced core begins in the source file
    pub fn expected_core_offset(&self) -> usize {
        self.source_offset() + self.context_before.len()
    }

    /// Check that the declared lengths agree with the hunk's lines
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.changed_lines.is_empty() {
            return Err("hunk has no changed lines".to_string());
        }
        if self.source_length != self.counted_source_length() {
            return Err(format!(
                "declared source length {} but hunk carries {} source lines",
                self.source_length,
                self.counted_source_length()
            ));
        }
        if self.target_length != self.counted_target_length() {
            return Err(format!(
                "declared target length {} but hunk carries {} target lines",
                self.target_length,
                self.counted_target_length()
            ));
        }

        Ok(())
    }

    /// Score the hunk against `lines` with its core starting at index `at`.
    ///
    /// The core must match exactly. Context lines that differ, or fall outside
    /// the file, count as mismatches; the window matches when there are at
    /// most `fuzz` of them. Returns the mismatch count, so `Some(0)` is an
    /// exact match and ranks highest.
    pub fn matches(&self, lines: &[String], at: usize, fuzz: usize) -> Option<usize> {
        let core_len = self.core_source_len();
        if at + core_len > lines.len() {
            return None;
        }
        if !self
            .core_source()
            .zip(&lines[at..at + core_len])
            .all(|(expected, actual)| expected == actual)
        {
            return None;
        }

        let mut mismatches = 0;

        let before_len = self.context_before.len();
        for (i, expected) in self.context_before.iter().enumerate() {
            let matched = (at + i)
                .checked_sub(before_len)
                .and_then(|idx| lines.get(idx))
                .is_some_and(|actual| actual == expected);
            if !matched {
                mismatches += 1;
            }
        }

        let after_start = at + core_len;
        for (j, expected) in self.context_after.iter().enumerate() {
            if lines.get(after_start + j) != Some(expected) {
                mismatches += 1;
            }
        }

        (mismatches <= fuzz).then_some(mismatches)
    }

    /// All lines of the hunk in file order, context included
    pub fn lines(&self) -> impl Iterator<Item = HunkLine> + '_ {
        self.context_before
            .iter()
            .map(|l| HunkLine::new(LineOp::Context, l.clone()))
            .chain(self.changed_lines.iter().cloned())
            .chain(
                self.context_after
                    .iter()
                    .map(|l| HunkLine::new(LineOp::Context, l.clone())),
            )
    }

    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.source_start, self.source_length, self.target_start, self.target_length
        )
    }
}

impl Display for Hunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.header())?;
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
