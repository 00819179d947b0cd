use crate::artifacts::script::line_range::LineRange;
use crate::artifacts::script::loaded_lines::{LoadedLines, Needle};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// A regex compiled in multi-line mode, so `^`/`$` anchor at line boundaries
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct LinePattern(Regex);

impl LinePattern {
    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl TryFrom<String> for LinePattern {
    type Error = regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        RegexBuilder::new(&pattern).multi_line(true).build().map(LinePattern)
    }
}

/// How a script entry picks the lines it acts on
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SelectorRepr")]
pub enum LineSelector {
    All,
    Line(i64),
    Values(Vec<LineSelector>),
    Find { text: String, offset: LineRange },
    FindRegex { pattern: LinePattern, offset: LineRange },
}

impl LineSelector {
    /// Resolve against the buffer as it currently stands
    ///
    /// Search results are shifted by the offset, ordered from the bottom of the
    /// file up, and de-duplicated by start line.
    pub fn resolve(&self, file: &LoadedLines) -> Vec<LineRange> {
        match self {
            LineSelector::All => file.full_range().into_iter().collect(),
            LineSelector::Line(line) => {
                if file.is_empty() {
                    Vec::new()
                } else {
                    vec![LineRange::single(file.validate_line(*line))]
                }
            }
            LineSelector::Values(children) => children
                .iter()
                .flat_map(|child| child.resolve(file))
                .collect(),
            LineSelector::Find { text, offset } => {
                bottom_up(file.find(Needle::Literal(text)), offset)
            }
            LineSelector::FindRegex { pattern, offset } => {
                bottom_up(file.find(Needle::Pattern(pattern.regex())), offset)
            }
        }
    }
}

fn bottom_up(found: Vec<LineRange>, offset: &LineRange) -> Vec<LineRange> {
    let mut ranges = found
        .iter()
        .map(|range| range.shifted(offset))
        .collect::<Vec<_>>();
    ranges.sort_by(|a, b| b.min.cmp(&a.min));
    ranges.dedup_by_key(|range| range.min);
    ranges
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorRepr {
    Keyword(String),
    Line(i64),
    Value {
        value: Box<SelectorRepr>,
    },
    Values {
        values: Vec<SelectorRepr>,
    },
    Find {
        find: String,
        offset: Option<LineRange>,
    },
    FindRegex {
        find_regex: String,
        offset: Option<LineRange>,
    },
}

impl TryFrom<SelectorRepr> for LineSelector {
    type Error = String;

    fn try_from(value: SelectorRepr) -> Result<Self, Self::Error> {
        let no_offset = LineRange::single(0);

        match value {
            SelectorRepr::Keyword(keyword) if keyword.eq_ignore_ascii_case("all") => Ok(LineSelector::All),
            SelectorRepr::Keyword(keyword) => Err(format!("unknown line selector {keyword:?}")),
            SelectorRepr::Line(line) => Ok(LineSelector::Line(line)),
            SelectorRepr::Value { value } => LineSelector::try_from(*value),
            SelectorRepr::Values { values } => values
                .into_iter()
                .map(LineSelector::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(LineSelector::Values),
            SelectorRepr::Find { find, offset } => Ok(LineSelector::Find {
                text: find,
                offset: offset.unwrap_or(no_offset),
            }),
            SelectorRepr::FindRegex { find_regex, offset } => Ok(LineSelector::FindRegex {
                pattern: LinePattern::try_from(find_regex).map_err(|e| e.to_string())?,
                offset: offset.unwrap_or(no_offset),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::snapshot::file_content::split_lines;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn file() -> LoadedLines {
        LoadedLines::from_lines(&split_lines("import a;\nclass A {\n  int x;\n  int y;\n}\n"))
    }

    fn resolve(json: &str) -> Vec<LineRange> {
        serde_json::from_str::<LineSelector>(json)
            .unwrap()
            .resolve(&file())
    }

    #[rstest]
    #[case(r#""all""#, vec![LineRange::new(1, 5)])]
    #[case(r#""ALL""#, vec![LineRange::new(1, 5)])]
    #[case("2", vec![LineRange::single(2)])]
    #[case("99", vec![LineRange::single(5)])]
    #[case("-4", vec![LineRange::single(1)])]
    #[case(r#"{"value": 3}"#, vec![LineRange::single(3)])]
    #[case(r#"{"values": [1, {"value": 4}]}"#, vec![LineRange::single(1), LineRange::single(4)])]
    fn resolves_numbered_selectors(#[case] json: &str, #[case] expected: Vec<LineRange>) {
        assert_eq!(resolve(json), expected);
    }

    #[test]
    fn find_results_run_bottom_up_with_offset() {
        assert_eq!(
            resolve(r#"{"find": "int", "offset": [-1, 0]}"#),
            vec![LineRange::new(3, 4), LineRange::new(2, 3)]
        );
        assert_eq!(
            resolve(r#"{"find_regex": "^  int (x|y);$"}"#),
            vec![LineRange::single(4), LineRange::single(3)]
        );
    }

    #[test]
    fn missing_text_selects_nothing() {
        assert!(resolve(r#"{"find": "enum"}"#).is_empty());
    }

    #[rstest]
    #[case(r#""first""#)]
    #[case(r#"{"find_regex": "(unclosed"}"#)]
    #[case(r#"{"find": "x", "offset": [3, 1]}"#)]
    #[case("[1, 2]")]
    fn rejects_invalid_selectors(#[case] json: &str) {
        assert!(serde_json::from_str::<LineSelector>(json).is_err());
    }
}
