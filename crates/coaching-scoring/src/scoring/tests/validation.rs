use super::common::*;
use crate::scoring::domain::{
    AggregationMode, GradeMapping, GradeType, MatchingType, ScoringConfig, ValueSource,
    NOT_CONFIGURED_SUMMARY,
};
use crate::scoring::validation::{is_valid, validate};

#[test]
fn reports_every_problem_in_one_pass() {
    let mut config = grade_config(
        "empty",
        GradeType::String,
        AggregationMode::BestMatch,
        Vec::new(),
    );
    config.aggregation_mode = None;

    let errors = validate(&config, Some(50.0));

    assert!(errors.len() >= 2, "expected accumulated errors, got {errors:?}");
    assert!(errors.contains(&"at least one grade mapping is required".to_string()));
    assert!(errors.contains(&"aggregation mode is required for grade matching".to_string()));
}

#[test]
fn duplicate_values_are_flagged_regardless_of_score() {
    let config = grade_config(
        "dupes",
        GradeType::String,
        AggregationMode::BestMatch,
        vec![
            GradeMapping::new("KSC", 40.0),
            GradeMapping::new(" KSC ", 10.0),
        ],
    );

    let errors = validate(&config, None);
    assert_eq!(errors, vec!["grade value 'KSC' appears more than once".to_string()]);
}

#[test]
fn negative_scores_are_flagged() {
    let config = grade_config(
        "negative",
        GradeType::String,
        AggregationMode::AnyMatch,
        vec![GradeMapping::new("KSC", -5.0)],
    );

    let errors = validate(&config, None);
    assert_eq!(errors, vec!["grade 'KSC' has a negative score (-5)".to_string()]);
}

#[test]
fn ceiling_only_applies_when_positive() {
    let config = grade_config(
        "ceiling",
        GradeType::String,
        AggregationMode::BestMatch,
        certification_ladder(),
    );

    assert_eq!(
        validate(&config, Some(30.0)),
        vec!["highest grade score 40 exceeds the item maximum score of 30".to_string()]
    );
    assert!(is_valid(&config, Some(40.0)));
    assert!(is_valid(&config, Some(0.0)));
    assert!(is_valid(&config, None));
}

#[test]
fn profile_sources_need_a_field() {
    let mut config = certification_config();
    config.value_source = Some(ValueSource::UserField);

    assert_eq!(
        validate(&config, None),
        vec!["source field is required when values come from USER_FIELD".to_string()]
    );

    config.source_field = Some("   ".to_string());
    assert!(!is_valid(&config, None));
}

#[test]
fn json_sources_need_field_and_path() {
    let mut config = certification_config();
    config.value_source = Some(ValueSource::JsonField);

    let errors = validate(&config, None);
    assert_eq!(errors.len(), 2);
    assert!(errors.contains(&"extract path is required when values come from JSON_FIELD".to_string()));

    config.source_field = Some("credentials".to_string());
    config.extract_pattern = Some("$.certs.name".to_string());
    assert!(is_valid(&config, None));
}

#[test]
fn every_illegal_aggregation_pair_is_rejected() {
    for grade_type in GradeType::ALL {
        for mode in AggregationMode::ALL {
            let config = grade_config("pair", grade_type, mode, presence_ladder(10.0));
            let errors = validate(&config, None);

            if grade_type.allows(mode) {
                assert!(errors.is_empty(), "{grade_type:?}/{mode:?} should pass: {errors:?}");
            } else {
                assert_eq!(
                    errors,
                    vec![format!(
                        "aggregation mode {} is not allowed for {} grades",
                        mode.label(),
                        grade_type.label()
                    )]
                );
            }
        }
    }
}

#[test]
fn grade_matching_needs_a_grade_type() {
    let mut config = certification_config();
    config.grade_type = None;

    assert_eq!(
        validate(&config, None),
        vec!["grade type is required for grade matching".to_string()]
    );
}

#[test]
fn missing_matching_type_is_reported() {
    let mut config = ScoringConfig::new(item_id("blank"));
    config.matching_type = None;

    assert_eq!(validate(&config, None), vec!["matching type is required".to_string()]);
}

#[test]
fn scalar_policies_skip_ladder_checks() {
    let config = scalar_config("exact", MatchingType::Exact);
    assert!(is_valid(&config, Some(10.0)));
}

#[test]
fn finalize_gates_the_configured_flag() {
    let mut config = grade_config(
        "kca-cert",
        GradeType::String,
        AggregationMode::Sum,
        certification_ladder(),
    );

    let errors = config.finalize(Some(50.0)).expect_err("SUM is illegal for strings");
    assert_eq!(errors.len(), 1);
    assert!(!config.configured);
    assert_eq!(config.summary(), NOT_CONFIGURED_SUMMARY);

    config.aggregation_mode = Some(AggregationMode::BestMatch);
    config.finalize(Some(50.0)).expect("valid after fix");
    assert!(config.configured);
    assert_eq!(config.summary(), "Grade / Best match");

    config.reset();
    assert!(!config.configured);
    assert_eq!(config.matching_type, Some(MatchingType::Exact));
    assert!(config.grade_mappings.is_empty());
    assert_eq!(config.item_id, item_id("kca-cert"));
}

fn range_brackets(id: &str, mappings: Vec<GradeMapping>) -> ScoringConfig {
    let mut config = scalar_config(id, MatchingType::Range);
    config.configured = false;
    config.grade_type = Some(GradeType::Numeric);
    config.aggregation_mode = Some(AggregationMode::BestMatch);
    config.grade_mappings = mappings;
    config
}

#[test]
fn range_brackets_follow_ladder_rules() {
    let repeated = range_brackets(
        "hours",
        vec![GradeMapping::new(100.0, 10.0), GradeMapping::new(100.0, 20.0)],
    );
    assert_eq!(
        validate(&repeated, None),
        vec!["grade value '100' appears more than once".to_string()]
    );

    let over_ceiling = range_brackets("hours", vec![GradeMapping::new(100.0, 90.0)]);
    assert_eq!(
        validate(&over_ceiling, Some(30.0)),
        vec!["highest grade score 90 exceeds the item maximum score of 30".to_string()]
    );

    let negative = range_brackets("hours", vec![GradeMapping::new(50.0, -1.0)]);
    assert_eq!(
        validate(&negative, None),
        vec!["grade '50' has a negative score (-1)".to_string()]
    );
}

#[test]
fn range_brackets_must_be_numeric() {
    let mut config = range_brackets(
        "hours",
        vec![GradeMapping::new("senior", 10.0), GradeMapping::new("200", 20.0)],
    );

    let errors = config.finalize(Some(30.0)).expect_err("text bound rejected");
    assert_eq!(errors, vec!["range bound 'senior' is not a number".to_string()]);
    assert!(!config.configured);

    config.grade_mappings[0] = GradeMapping::new(100.0, 10.0);
    config.finalize(Some(30.0)).expect("numeric bounds are valid");
    assert!(config.configured);
}

#[test]
fn range_without_brackets_needs_no_ladder() {
    let config = scalar_config("hours", MatchingType::Range);
    assert!(is_valid(&config, Some(30.0)));
}
