use crate::artifacts::script::line_range::LineRange;
use crate::artifacts::script::loaded_lines::{LoadedLines, Needle};
use crate::artifacts::script::selector::{LinePattern, LineSelector};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Insert `value` after the selected lines
    Insert { value: String },
    /// Insert `value` before the selected lines
    InsertBefore { value: String },
    /// Replace the selected lines with `value`
    Set { value: String },
    /// Replace literal `find` with `replace` where it lies within the selection
    Replace { find: String, replace: String },
    /// Regex replacement over the selected text; `$1`-style group references
    ReplaceRegex { find: LinePattern, replace: String },
}

impl ScriptAction {
    /// Apply to one resolved range; returns whether the buffer changed
    pub fn apply(&self, file: &mut LoadedLines, range: &LineRange) -> bool {
        match self {
            ScriptAction::Insert { value } => {
                let after = range.max.min(file.len() as i64).max(0) as usize;
                file.insert_at(after + 1, value.clone());
                true
            }
            ScriptAction::InsertBefore { value } => {
                let before = range.min.max(1) as usize;
                file.insert_at(before, value.clone());
                true
            }
            ScriptAction::Set { value } => file.set(range, value.clone()),
            ScriptAction::Replace { find, replace } => {
                let mut changed = false;
                for found in file.find(Needle::Literal(find)) {
                    if found.is_within(range) {
                        let text = file.text(&found).replace(find.as_str(), replace);
                        changed |= file.set(&found, text);
                    }
                }
                changed
            }
            ScriptAction::ReplaceRegex { find, replace } => {
                let text = file.text(range);
                if !find.regex().is_match(&text) {
                    return false;
                }
                let replaced = find.regex().replace_all(&text, replace.as_str()).into_owned();
                file.set(range, replaced)
            }
        }
    }
}

/// One action and the selectors it applies to
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEntry {
    #[serde(flatten)]
    pub action: ScriptAction,
    pub lines: Vec<LineSelector>,
}

impl ScriptEntry {
    /// Resolve each selector against the current buffer and act on every range
    pub fn apply(&self, file: &mut LoadedLines) -> usize {
        let mut applied = 0;

        for selector in &self.lines {
            let ranges = selector.resolve(file);
            if ranges.is_empty() {
                tracing::debug!(?selector, "selector matched no lines");
            }
            for range in ranges {
                if self.action.apply(file, &range) {
                    applied += 1;
                }
            }
        }

        applied
    }
}
