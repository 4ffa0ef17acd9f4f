use super::super::domain::{format_number, AggregationMode};

/// One candidate value and the score it earned on its own.
pub(crate) struct ValueOutcome<'a> {
    pub raw: &'a str,
    pub matched: Option<f64>,
}

pub(crate) struct Aggregate {
    pub score: f64,
    pub matched: Vec<String>,
    pub notes: String,
}

/// Combine per-value outcomes into the item score.
///
/// `ceiling` caps modes that accumulate across values; zero or less means uncapped.
pub(crate) fn aggregate(mode: AggregationMode, outcomes: &[ValueOutcome<'_>], ceiling: f64) -> Aggregate {
    match mode {
        AggregationMode::AnyMatch => match outcomes.iter().find(|outcome| outcome.matched.is_some()) {
            Some(outcome) => single(outcome, "first matching value"),
            None => unmatched(outcomes.len()),
        },
        AggregationMode::First => match outcomes.first() {
            Some(outcome) if outcome.matched.is_some() => single(outcome, "first value"),
            _ => unmatched(outcomes.len().min(1)),
        },
        AggregationMode::BestMatch => {
            let best = outcomes
                .iter()
                .filter(|outcome| outcome.matched.is_some())
                .fold(None::<&ValueOutcome<'_>>, |best, outcome| match best {
                    Some(current) if current.matched >= outcome.matched => Some(current),
                    _ => Some(outcome),
                });
            match best {
                Some(outcome) => single(outcome, "best matching value"),
                None => unmatched(outcomes.len()),
            }
        }
        AggregationMode::Count => {
            let qualifying: Vec<&ValueOutcome<'_>> = outcomes
                .iter()
                .filter(|outcome| outcome.matched.is_some())
                .collect();
            let total: f64 = qualifying.iter().filter_map(|outcome| outcome.matched).sum();
            Aggregate {
                score: cap(total, ceiling),
                matched: qualifying.iter().map(|outcome| outcome.raw.to_string()).collect(),
                notes: format!("{} qualifying value(s)", qualifying.len()),
            }
        }
        AggregationMode::Sum => {
            let numbers = numeric(outcomes);
            let total: f64 = numbers.iter().map(|(_, number)| number).sum();
            Aggregate {
                score: cap(total, ceiling),
                matched: numbers.iter().map(|(raw, _)| raw.to_string()).collect(),
                notes: format!("sum of {} value(s) is {}", numbers.len(), format_number(total)),
            }
        }
        AggregationMode::Max => {
            let numbers = numeric(outcomes);
            match numbers
                .iter()
                .copied()
                .reduce(|best, next| if next.1 > best.1 { next } else { best })
            {
                Some((raw, number)) => Aggregate {
                    score: cap(number, ceiling),
                    matched: vec![raw.to_string()],
                    notes: format!("largest value is {}", format_number(number)),
                },
                None => unmatched(outcomes.len()),
            }
        }
    }
}

fn single(outcome: &ValueOutcome<'_>, reason: &str) -> Aggregate {
    let score = outcome.matched.unwrap_or(0.0);
    Aggregate {
        score,
        matched: vec![outcome.raw.to_string()],
        notes: format!("{reason} '{}' scored {}", outcome.raw, format_number(score)),
    }
}

fn unmatched(considered: usize) -> Aggregate {
    Aggregate {
        score: 0.0,
        matched: Vec::new(),
        notes: format!("none of {considered} value(s) matched"),
    }
}

fn numeric<'a>(outcomes: &[ValueOutcome<'a>]) -> Vec<(&'a str, f64)> {
    outcomes
        .iter()
        .filter_map(|outcome| {
            outcome
                .raw
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(|number| (outcome.raw, number))
        })
        .collect()
}

fn cap(score: f64, ceiling: f64) -> f64 {
    let score = score.max(0.0);
    if ceiling > 0.0 {
        score.min(ceiling)
    } else {
        score
    }
}
