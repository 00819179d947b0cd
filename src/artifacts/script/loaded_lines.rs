//! Editable line buffer for directive scripts
//!
//! Line numbers stay fixed for the whole script: `set` collapses a range into
//! its first slot (which may then hold several physical lines) and blanks the
//! rest, and insertions are queued against a line number and only emitted by
//! [`LoadedLines::render`].

use crate::artifacts::script::line_range::LineRange;
use regex::Regex;
use std::collections::BTreeMap;

pub enum Needle<'n> {
    Literal(&'n str),
    Pattern(&'n Regex),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLines {
    slots: Vec<Option<String>>,
    inserts: BTreeMap<usize, Vec<String>>,
    trailing_newline: bool,
}

impl LoadedLines {
    /// Load lines that keep their terminators, as held by a text snapshot
    pub fn from_lines(lines: &[String]) -> Self {
        let trailing_newline = lines.last().is_some_and(|line| line.ends_with('\n'));
        let slots = lines
            .iter()
            .map(|line| Some(line.strip_suffix('\n').unwrap_or(line).to_string()))
            .collect();

        LoadedLines {
            slots,
            inserts: BTreeMap::new(),
            trailing_newline,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Clamp a line number into `1..=len`
    pub fn validate_line(&self, line: i64) -> i64 {
        line.min(self.len() as i64).max(1)
    }

    /// The whole file as a range; `None` for an empty file
    pub fn full_range(&self) -> Option<LineRange> {
        (!self.is_empty()).then(|| LineRange::new(1, self.len() as i64))
    }

    // 0-based slot indices of the part of `range` inside the file
    fn slot_bounds(&self, range: &LineRange) -> Option<(usize, usize)> {
        let min = range.min.max(1);
        let max = range.max.min(self.len() as i64);
        (min <= max).then(|| (min as usize - 1, max as usize - 1))
    }

    /// Text of the live lines in `range`, joined by `\n`
    pub fn text(&self, range: &LineRange) -> String {
        let Some((first, last)) = self.slot_bounds(range) else {
            return String::new();
        };

        self.slots[first..=last]
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the lines of `range` with `value`, keeping the numbering of later lines
    pub fn set(&mut self, range: &LineRange, value: String) -> bool {
        let Some((first, last)) = self.slot_bounds(range) else {
            return false;
        };

        self.slots[first] = Some(value);
        for slot in &mut self.slots[first + 1..=last] {
            *slot = None;
        }
        true
    }

    /// Queue `value` to be written before line `line` (after the last line when `line > len`)
    pub fn insert_at(&mut self, line: usize, value: String) {
        self.inserts.entry(line).or_default().push(value);
    }

    /// Line ranges spanned by every match of `needle` across the live text
    pub fn find(&self, needle: Needle<'_>) -> Vec<LineRange> {
        let mut text = String::new();
        // (byte offset in `text`, 1-based line number)
        let mut starts: Vec<(usize, usize)> = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(line) = slot else {
                continue;
            };
            if !starts.is_empty() {
                text.push('\n');
            }
            starts.push((text.len(), index + 1));
            text.push_str(line);
        }

        if starts.is_empty() {
            return Vec::new();
        }

        let line_at = |offset: usize| {
            let i = starts.partition_point(|(start, _)| *start <= offset);
            starts[i.saturating_sub(1)].1 as i64
        };

        let spans: Vec<(usize, usize)> = match needle {
            Needle::Literal("") => Vec::new(),
            Needle::Literal(literal) => text
                .match_indices(literal)
                .map(|(start, found)| (start, start + found.len()))
                .collect(),
            Needle::Pattern(regex) => regex.find_iter(&text).map(|m| (m.start(), m.end())).collect(),
        };

        spans
            .into_iter()
            .map(|(start, end)| LineRange::new(line_at(start), line_at(end.max(start + 1) - 1)))
            .collect()
    }

    /// Write the buffer out, emitting queued insertions in front of their line
    pub fn render(&self) -> String {
        let mut out: Vec<&str> = Vec::new();

        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(inserts) = self.inserts.get(&(index + 1)) {
                out.extend(inserts.iter().map(String::as_str));
            }
            if let Some(line) = slot {
                out.push(line);
            }
        }
        for inserts in self.inserts.range(self.len() + 1..).map(|(_, v)| v) {
            out.extend(inserts.iter().map(String::as_str));
        }

        let mut rendered = out.join("\n");
        if !out.is_empty() && (self.trailing_newline || self.is_empty()) {
            rendered.push('\n');
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::snapshot::file_content::split_lines;
    use pretty_assertions::assert_eq;

    fn load(text: &str) -> LoadedLines {
        LoadedLines::from_lines(&split_lines(text))
    }

    #[test]
    fn set_keeps_missing_trailing_newline() {
        let mut file = load("Hello\nWorld\nLast Line");

        file.set(&LineRange::single(1), "Hola".to_string());
        assert_eq!(file.render(), "Hola\nWorld\nLast Line");

        file.set(&LineRange::single(3), "Última Línea".to_string());
        assert_eq!(file.render(), "Hola\nWorld\nÚltima Línea");
    }

    #[test]
    fn collapsed_range_keeps_later_numbering() {
        let mut file = load("a\nb\nc\nd\n");

        file.set(&LineRange::new(1, 2), "ab".to_string());
        file.set(&LineRange::single(4), "D".to_string());

        assert_eq!(file.render(), "ab\nc\nD\n");
    }

    #[test]
    fn insertions_are_emitted_around_original_lines() {
        let mut file = load("a\nb\n");

        file.insert_at(2, "before b".to_string());
        file.insert_at(3, "at end".to_string());
        file.insert_at(2, "also before b".to_string());

        assert_eq!(file.render(), "a\nbefore b\nalso before b\nb\nat end\n");
    }

    #[test]
    fn finds_single_and_multi_line_matches() {
        let file = load("one\ntwo\nthree\ntwo\n");

        assert_eq!(
            file.find(Needle::Literal("two")),
            vec![LineRange::single(2), LineRange::single(4)]
        );
        assert_eq!(
            file.find(Needle::Literal("two\nthr")),
            vec![LineRange::new(2, 3)]
        );

        let regex = regex::RegexBuilder::new("^t.*e$")
            .multi_line(true)
            .build()
            .unwrap();
        assert_eq!(file.find(Needle::Pattern(&regex)), vec![LineRange::single(3)]);
    }

    #[test]
    fn out_of_range_edits_are_ignored() {
        let mut file = load("a\n");

        assert!(!file.set(&LineRange::new(5, 9), "x".to_string()));
        assert_eq!(file.text(&LineRange::new(-3, 0)), "");
        assert_eq!(file.validate_line(42), 1);
    }
}
