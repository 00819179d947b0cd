//! Patch document format
//!
//! A document is a sequence of file blocks. Each block opens with a header
//! naming the operation and path, followed by unified-diff style hunks:
//!
//! ```text
//! === modify src/Main.java
//! @@ -3,4 +3,4 @@
//!  context
//! -removed
//! +added
//!  context
//! === rename src/Old.java => src/New.java
//! === add binary assets/logo.png
//! ```
//!
//! Lines keep their content byte for byte. A final line without a newline is
//! followed by `\ No newline at end of file`. Blank lines and `#` comments are
//! allowed between blocks. Decoding is the exact inverse of encoding.

use crate::artifacts::errors::{PatchError, PatchResult};
use crate::artifacts::hunk::{Hunk, HunkLine, LineOp};
use crate::artifacts::patch::{FileOp, FilePatch, PatchSet};
use crate::artifacts::snapshot::file_content::ContentKind;
use regex::Regex;
use std::iter::{Enumerate, Peekable};
use std::path::{Path, PathBuf};
use std::str::SplitInclusive;

const FILE_HEADER: &str = "=== ";
pub(crate) const RENAME_SEPARATOR: &str = " => ";
pub(crate) const BINARY_MARKER: &str = "binary ";
const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

const HUNK_HEADER_REGEX: &str = r"^@@ -(\d+),(\d+) \+(\d+),(\d+) @@";

#[derive(Debug, Clone, Copy)]
enum OpKeyword {
    Add,
    Delete,
    Modify,
    Rename,
}

static OP_KEYWORDS: phf::Map<&'static str, OpKeyword> = phf::phf_map! {
    "add" => OpKeyword::Add,
    "delete" => OpKeyword::Delete,
    "modify" => OpKeyword::Modify,
    "rename" => OpKeyword::Rename,
};

pub fn encode(patch_set: &PatchSet) -> String {
    let mut out = String::new();
    for patch in patch_set.iter() {
        encode_file_patch(patch, &mut out);
    }
    out
}

pub fn encode_file_patch(patch: &FilePatch, out: &mut String) {
    out.push_str(FILE_HEADER);
    out.push_str(patch.op.keyword());
    out.push(' ');
    if patch.encoding == ContentKind::Binary {
        out.push_str(BINARY_MARKER);
    }
    out.push_str(&path_text(&patch.path));
    if let FileOp::Rename(to) = &patch.op {
        out.push_str(RENAME_SEPARATOR);
        out.push_str(&path_text(to));
    }
    out.push('\n');

    for hunk in &patch.hunks {
        out.push_str(&hunk.header());
        out.push('\n');
        for line in hunk.lines() {
            out.push(line.op.prefix());
            match line.line.strip_suffix('\n') {
                Some(body) => {
                    out.push_str(body);
                    out.push('\n');
                }
                None => {
                    out.push_str(&line.line);
                    out.push('\n');
                    out.push_str(NO_NEWLINE_MARKER);
                    out.push('\n');
                }
            }
        }
    }
}

pub fn decode(text: &str) -> PatchResult<PatchSet> {
    decode_named("<patch>", text)
}

/// Decode a document, naming it `source_name` in any error
pub fn decode_named(source_name: &str, text: &str) -> PatchResult<PatchSet> {
    Decoder::new(source_name, text)?.run()
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

struct Decoder<'t> {
    source_name: &'t str,
    lines: Peekable<Enumerate<SplitInclusive<'t, char>>>,
    last_line: usize,
    hunk_header: Regex,
}

impl<'t> Decoder<'t> {
    fn new(source_name: &'t str, text: &'t str) -> PatchResult<Self> {
        let hunk_header = Regex::new(HUNK_HEADER_REGEX)
            .map_err(|e| PatchError::malformed(source_name, 0, e.to_string()))?;

        Ok(Decoder {
            source_name,
            lines: text.split_inclusive('\n').enumerate().peekable(),
            last_line: 0,
            hunk_header,
        })
    }

    fn next_line(&mut self) -> Option<(usize, &'t str)> {
        let (index, raw) = self.lines.next()?;
        self.last_line = index + 1;
        Some((index + 1, raw.strip_suffix('\n').unwrap_or(raw)))
    }

    fn peek_is_marker(&mut self) -> bool {
        self.lines
            .peek()
            .is_some_and(|(_, raw)| raw.starts_with('\\'))
    }

    fn error(&self, line: usize, reason: impl Into<String>) -> PatchError {
        PatchError::malformed(self.source_name, line, reason)
    }

    fn run(mut self) -> PatchResult<PatchSet> {
        let mut patch_set = PatchSet::new();
        let mut current: Option<(usize, FilePatch)> = None;

        while let Some((number, text)) = self.next_line() {
            if let Some(header) = text.strip_prefix(FILE_HEADER) {
                if let Some((header_line, patch)) = current.take() {
                    self.finish(&mut patch_set, header_line, patch)?;
                }
                current = Some((number, self.parse_header(number, header)?));
            } else if text.starts_with("@@") {
                let Some((_, patch)) = current.as_mut() else {
                    return Err(self.error(number, "hunk appears before any file header"));
                };
                let hunk = self.parse_hunk(number, text)?;
                patch.hunks.push(hunk);
            } else if text.trim().is_empty() || text.starts_with('#') {
                continue;
            } else {
                return Err(self.error(number, format!("unexpected line outside of a hunk: {text:?}")));
            }
        }

        if let Some((header_line, patch)) = current.take() {
            self.finish(&mut patch_set, header_line, patch)?;
        }

        Ok(patch_set)
    }

    fn finish(&self, patch_set: &mut PatchSet, header_line: usize, patch: FilePatch) -> PatchResult<()> {
        patch
            .validate()
            .map_err(|(hunk, reason)| self.error(header_line, format!("hunk {hunk}: {reason}")))?;
        patch_set.insert(patch).map_err(|duplicate| {
            self.error(
                header_line,
                format!("duplicate patch for {}", duplicate.path.display()),
            )
        })
    }

    fn parse_header(&self, number: usize, header: &str) -> PatchResult<FilePatch> {
        let (keyword, rest) = header
            .split_once(' ')
            .ok_or_else(|| self.error(number, "file header names no path"))?;
        let keyword = OP_KEYWORDS
            .get(keyword)
            .copied()
            .ok_or_else(|| self.error(number, format!("unknown file operation {keyword:?}")))?;

        let (encoding, rest) = match rest.strip_prefix(BINARY_MARKER) {
            Some(rest) => (ContentKind::Binary, rest),
            None => (ContentKind::Text, rest),
        };
        if rest.is_empty() {
            return Err(self.error(number, "file header names no path"));
        }

        let (path, op) = match keyword {
            OpKeyword::Add => (rest, FileOp::Add),
            OpKeyword::Delete => (rest, FileOp::Delete),
            OpKeyword::Modify => (rest, FileOp::Modify),
            OpKeyword::Rename => {
                let (from, to) = rest
                    .split_once(RENAME_SEPARATOR)
                    .filter(|(from, to)| !from.is_empty() && !to.is_empty())
                    .ok_or_else(|| self.error(number, "rename header must read `<old> => <new>`"))?;
                (from, FileOp::Rename(PathBuf::from(to)))
            }
        };

        Ok(FilePatch::new(PathBuf::from(path), op, encoding, Vec::new()))
    }

    fn parse_hunk(&mut self, number: usize, header: &str) -> PatchResult<Hunk> {
        let captures = self
            .hunk_header
            .captures(header)
            .ok_or_else(|| self.error(number, format!("invalid hunk header {header:?}")))?;
        let field = |i: usize| -> PatchResult<usize> {
            captures[i]
                .parse::<usize>()
                .map_err(|e| self.error(number, format!("invalid hunk coordinate: {e}")))
        };
        let (source_start, source_length) = (field(1)?, field(2)?);
        let (target_start, target_length) = (field(3)?, field(4)?);

        let mismatch = |decoder: &Self, line: usize, source: usize, target: usize| {
            decoder.error(
                line,
                format!(
                    "hunk line count mismatch: header declares -{source_length},+{target_length} \
                     but hunk has -{source},+{target}"
                ),
            )
        };

        let mut body: Vec<HunkLine> = Vec::new();
        let (mut source, mut target) = (0usize, 0usize);

        loop {
            if source == source_length && target == target_length {
                if self.peek_is_marker() {
                    self.next_line();
                    self.strip_last_newline(&mut body, self.last_line)?;
                }
                break;
            }

            let Some((line_number, text)) = self.next_line() else {
                return Err(mismatch(self, self.last_line, source, target));
            };

            if text.starts_with('\\') {
                self.strip_last_newline(&mut body, line_number)?;
                continue;
            }
            if text.starts_with(FILE_HEADER) || text.starts_with("@@") {
                return Err(mismatch(self, line_number, source, target));
            }

            let (op, content) = match text.chars().next() {
                None => (LineOp::Context, ""),
                Some(prefix) => {
                    let op = LineOp::try_from_prefix(prefix).ok_or_else(|| {
                        self.error(line_number, format!("invalid line prefix {prefix:?}"))
                    })?;
                    (op, &text[prefix.len_utf8()..])
                }
            };

            if op.in_source() {
                source += 1;
            }
            if op.in_target() {
                target += 1;
            }
            if source > source_length || target > target_length {
                return Err(mismatch(self, line_number, source, target));
            }

            body.push(HunkLine::new(op, format!("{content}\n")));
        }

        let first = body.iter().position(|l| l.op != LineOp::Context);
        let last = body.iter().rposition(|l| l.op != LineOp::Context);
        let (Some(first), Some(last)) = (first, last) else {
            return Err(self.error(number, "hunk has no added or removed lines"));
        };

        let context_after = body
            .drain(last + 1..)
            .map(|l| l.line)
            .collect::<Vec<_>>();
        let changed_lines = body.drain(first..).collect::<Vec<_>>();
        let context_before = body.into_iter().map(|l| l.line).collect::<Vec<_>>();

        Ok(Hunk {
            source_start,
            source_length,
            target_start,
            target_length,
            context_before,
            context_after,
            changed_lines,
        })
    }

    fn strip_last_newline(&self, body: &mut [HunkLine], line: usize) -> PatchResult<()> {
        let last = body
            .last_mut()
            .ok_or_else(|| self.error(line, "end-of-file marker without a preceding line"))?;
        if last.line.pop() != Some('\n') {
            return Err(self.error(line, "repeated end-of-file marker"));
        }
        Ok(())
    }
}
