use super::super::domain::{GradeMapping, GradeType};

const EXISTS_ALIASES: [&str; 2] = ["exists", "있음"];
const NONE_ALIASES: [&str; 2] = ["none", "없음"];

/// Inclusive numeric bounds; an open side is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Interval {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Interval {
    fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Comparison resolved from a policy and its item definition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MatchTarget {
    Exact(String),
    Contains(String),
    Interval(Interval),
    /// `(lower bound, score)` ordered from the highest bound down.
    Brackets(Vec<(f64, f64)>),
    Grade {
        grade_type: GradeType,
        rungs: Vec<GradeMapping>,
    },
}

impl MatchTarget {
    /// Score earned by a single value, or `None` when it does not qualify.
    pub(crate) fn score_value(&self, raw: &str, full_score: f64) -> Option<f64> {
        let value = raw.trim();
        match self {
            MatchTarget::Exact(expected) => (value == expected.as_str()).then_some(full_score),
            MatchTarget::Contains(needle) => value.contains(needle.as_str()).then_some(full_score),
            MatchTarget::Interval(interval) => parse_number(value)
                .filter(|number| interval.contains(*number))
                .map(|_| full_score),
            MatchTarget::Brackets(brackets) => {
                let number = parse_number(value)?;
                brackets
                    .iter()
                    .find(|(bound, _)| number >= *bound)
                    .map(|(_, score)| *score)
            }
            MatchTarget::Grade { grade_type, rungs } => {
                find_rung(*grade_type, rungs, value).map(|rung| rung.score)
            }
        }
    }
}

fn find_rung<'r>(grade_type: GradeType, rungs: &'r [GradeMapping], value: &str) -> Option<&'r GradeMapping> {
    match grade_type {
        GradeType::FileExists => {
            let wanted: &[&str] = if NONE_ALIASES.contains(&value) || value.is_empty() {
                &NONE_ALIASES
            } else {
                &EXISTS_ALIASES
            };
            rungs
                .iter()
                .find(|rung| wanted.contains(&rung.value.key().as_str()))
        }
        GradeType::Numeric => {
            let number = parse_number(value);
            rungs.iter().find(|rung| match (number, rung.value.as_number()) {
                (Some(left), Some(right)) => left == right,
                _ => rung.value.key() == value,
            })
        }
        GradeType::String | GradeType::MultiSelect => {
            rungs.iter().find(|rung| rung.value.key() == value)
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Parse `N`, `A..B`, `A..`, or `..B` into inclusive bounds.
pub(crate) fn parse_interval(expression: &str) -> Option<Interval> {
    let expression = expression.trim();
    let Some((low, high)) = expression.split_once("..") else {
        return parse_number(expression).map(|min| Interval {
            min: Some(min),
            max: None,
        });
    };

    let bound = |side: &str| -> Result<Option<f64>, ()> {
        if side.trim().is_empty() {
            Ok(None)
        } else {
            parse_number(side).map(Some).ok_or(())
        }
    };

    let interval = Interval {
        min: bound(low).ok()?,
        max: bound(high).ok()?,
    };

    match interval {
        Interval {
            min: None,
            max: None,
        } => None,
        Interval {
            min: Some(min),
            max: Some(max),
        } if min > max => None,
        _ => Some(interval),
    }
}

/// Ladder rungs read as numeric lower bounds; the first non-numeric value is returned as the error.
pub(crate) fn brackets(rungs: &[GradeMapping]) -> Result<Vec<(f64, f64)>, String> {
    let mut brackets = rungs
        .iter()
        .map(|rung| {
            rung.value
                .as_number()
                .map(|bound| (bound, rung.score))
                .ok_or_else(|| rung.value.key())
        })
        .collect::<Result<Vec<_>, _>>()?;

    brackets.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(brackets)
}
