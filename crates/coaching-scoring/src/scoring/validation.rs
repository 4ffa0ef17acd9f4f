use std::collections::BTreeSet;

use super::domain::{calculate_total_score, format_number, MatchingType, ScoringConfig, ValueSource};

/// Check a policy for internal consistency and against the item's ceiling.
///
/// Every applicable rule runs; an empty list means the policy may be finalized.
pub fn validate(config: &ScoringConfig, max_score: Option<f64>) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(matching_type) = config.matching_type else {
        errors.push("matching type is required".to_string());
        check_source(config, &mut errors);
        return errors;
    };

    if matching_type == MatchingType::Grade {
        if config.grade_type.is_none() {
            errors.push("grade type is required for grade matching".to_string());
        }
        if config.grade_mappings.is_empty() {
            errors.push("at least one grade mapping is required".to_string());
        }
    }

    if !config.grade_mappings.is_empty() {
        check_ladder(config, max_score, &mut errors);
    }
    if matching_type == MatchingType::Range {
        check_bounds(config, &mut errors);
    }

    check_source(config, &mut errors);
    check_aggregation(config, matching_type, &mut errors);

    errors
}

pub fn is_valid(config: &ScoringConfig, max_score: Option<f64>) -> bool {
    validate(config, max_score).is_empty()
}

/// Rules every ladder obeys, whichever matching type reads it.
fn check_ladder(config: &ScoringConfig, max_score: Option<f64>, errors: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for mapping in &config.grade_mappings {
        let key = mapping.value.key();
        if !seen.insert(key.clone()) {
            duplicates.insert(key);
        }
    }
    for value in duplicates {
        errors.push(format!("grade value '{value}' appears more than once"));
    }

    for mapping in &config.grade_mappings {
        if mapping.score.is_nan() || mapping.score < 0.0 {
            errors.push(format!(
                "grade '{}' has a negative score ({})",
                mapping.value.key(),
                format_number(mapping.score)
            ));
        }
    }

    if let Some(ceiling) = max_score.filter(|ceiling| *ceiling > 0.0) {
        let highest = calculate_total_score(config);
        if highest > ceiling {
            errors.push(format!(
                "highest grade score {} exceeds the item maximum score of {}",
                format_number(highest),
                format_number(ceiling)
            ));
        }
    }
}

/// Range ladders are read as numeric lower bounds.
fn check_bounds(config: &ScoringConfig, errors: &mut Vec<String>) {
    for mapping in &config.grade_mappings {
        if mapping.value.as_number().map_or(true, |bound| !bound.is_finite()) {
            errors.push(format!(
                "range bound '{}' is not a number",
                mapping.value.key()
            ));
        }
    }
}

fn check_source(config: &ScoringConfig, errors: &mut Vec<String>) {
    let source = config.value_source();
    if !source.requires_source_field() {
        return;
    }

    if is_blank(config.source_field.as_deref()) {
        errors.push(format!(
            "source field is required when values come from {source}"
        ));
    }

    if source == ValueSource::JsonField && is_blank(config.extract_pattern.as_deref()) {
        errors.push("extract path is required when values come from JSON_FIELD".to_string());
    }
}

fn check_aggregation(config: &ScoringConfig, matching_type: MatchingType, errors: &mut Vec<String>) {
    let Some(mode) = config.aggregation_mode else {
        if matching_type == MatchingType::Grade {
            errors.push("aggregation mode is required for grade matching".to_string());
        }
        return;
    };

    if let Some(grade_type) = config.grade_type {
        if !grade_type.allows(mode) {
            errors.push(format!(
                "aggregation mode {} is not allowed for {} grades",
                mode.label(),
                grade_type.label()
            ));
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|value| value.trim().is_empty()).unwrap_or(true)
}
