use serde::Deserialize;

/// Inclusive range of 1-based line numbers, also used for selector offsets
///
/// Deserializes from a number (`3`), a pair (`[2, 5]`) or an object with
/// `min` and/or `max` (`{"min": -1}`). Pairs and objects need `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "LineRangeRepr")]
pub struct LineRange {
    pub min: i64,
    pub max: i64,
}

impl LineRange {
    pub fn new(min: i64, max: i64) -> Self {
        LineRange { min, max }
    }

    pub fn single(line: i64) -> Self {
        LineRange::new(line, line)
    }

    pub fn is_within(&self, other: &LineRange) -> bool {
        self.min >= other.min && self.max <= other.max
    }

    /// Shift both ends by the matching ends of `offset`
    pub fn shifted(&self, offset: &LineRange) -> LineRange {
        LineRange::new(
            self.min.saturating_add(offset.min),
            self.max.saturating_add(offset.max),
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LineRangeRepr {
    Exact(i64),
    Pair(Vec<i64>),
    Bounds { min: Option<i64>, max: Option<i64> },
}

impl TryFrom<LineRangeRepr> for LineRange {
    type Error = String;

    fn try_from(value: LineRangeRepr) -> Result<Self, Self::Error> {
        match value {
            LineRangeRepr::Exact(line) => Ok(LineRange::single(line)),
            LineRangeRepr::Pair(pair) => {
                let &[min, max] = pair.as_slice() else {
                    return Err(format!(
                        "a line range pair needs exactly two elements, got {}",
                        pair.len()
                    ));
                };
                if max <= min {
                    return Err("the second value of a line range must be greater than the first".into());
                }
                Ok(LineRange::new(min, max))
            }
            LineRangeRepr::Bounds { min: None, max: None } => {
                Err("a line range object needs a min or a max".into())
            }
            LineRangeRepr::Bounds { min, max } => {
                let (min, max) = (min.unwrap_or(0), max.unwrap_or(i64::from(i32::MAX)));
                if max <= min {
                    return Err("the max of a line range must be greater than its min".into());
                }
                Ok(LineRange::new(min, max))
            }
        }
    }
}
