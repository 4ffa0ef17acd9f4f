use super::common::*;
use crate::scoring::catalog::{
    apply_template, suggest, suggested_templates, template_by_id, templates, ChoiceTag,
    Suggestion,
};
use crate::scoring::domain::{
    AggregationMode, CompetencyItem, GradeType, MatchingType, UserProfile, ValueSource,
};
use crate::scoring::evaluation::evaluate;
use crate::scoring::validation::validate;

#[test]
fn certification_name_suggests_kca_first() {
    let suggestions = suggested_templates("코칭 자격증");

    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].id, "kca_certification");
    assert!(suggestions
        .iter()
        .skip(1)
        .all(|template| template.id != "kca_certification"));
}

#[test]
fn unrelated_name_has_no_suggestions() {
    assert!(suggested_templates("자갈밭").is_empty());
    assert_eq!(suggest("자갈밭"), Suggestion::None);
}

#[test]
fn keyword_match_ignores_case() {
    let suggestions = suggested_templates("ICF Credential");
    assert_eq!(suggestions.first().map(|t| t.id), Some("icf_certification"));
}

#[test]
fn suggestions_follow_registration_order() {
    let ids: Vec<&str> = templates().iter().map(|template| template.id).collect();
    let suggested: Vec<&str> = suggested_templates("상담 자격증")
        .into_iter()
        .map(|template| template.id)
        .collect();

    let positions: Vec<usize> = suggested
        .iter()
        .map(|id| ids.iter().position(|known| known == id).expect("registered"))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();

    assert_eq!(positions, sorted);
    assert!(suggested.contains(&"counseling_by_name"));
    assert!(suggested.contains(&"other_certification_by_exists"));
}

#[test]
fn two_way_family_requires_a_choice() {
    match suggest("상담 관련 경력") {
        Suggestion::Choose { by_name, by_exists } => {
            assert_eq!(by_name.id, "counseling_by_name");
            assert_eq!(by_exists.id, "counseling_by_exists");
            assert_eq!(by_name.needs_choice(), Some(ChoiceTag::ByName));
            assert_eq!(by_exists.needs_choice(), Some(ChoiceTag::ByExists));
        }
        other => panic!("expected a by-name / by-exists choice, got {other:?}"),
    }
}

#[test]
fn single_template_family_applies_directly() {
    match suggest("최종 학력") {
        Suggestion::Apply(template) => assert_eq!(template.id, "education_degree"),
        other => panic!("expected education template, got {other:?}"),
    }
}

#[test]
fn counterparts_point_at_each_other() {
    let by_exists = template_by_id("other_certification_by_exists").expect("registered");
    let by_name = by_exists.counterpart().expect("has a by-name counterpart");

    assert_eq!(by_name.id, "other_certification_by_name");
    assert_eq!(by_name.counterpart().map(|t| t.id), Some(by_exists.id));
    assert!(template_by_id("kca_certification")
        .and_then(|template| template.counterpart())
        .is_none());
}

#[test]
fn unknown_template_id_is_none() {
    assert!(template_by_id("does_not_exist").is_none());
}

#[test]
fn applied_template_is_an_independent_copy() {
    let template = template_by_id("kca_certification").expect("registered");
    let mut config = apply_template(item_id("kca-cert"), template);

    assert!(!config.configured);
    assert!(config.fixed_grades);
    assert!(!config.allow_add_grades);
    assert_eq!(config.grade_type, Some(GradeType::String));
    assert_eq!(config.aggregation_mode, Some(AggregationMode::BestMatch));
    assert_eq!(config.grade_mappings.len(), 3);

    config.grade_mappings[0].score = 1.0;
    config.grade_mappings.clear();

    let pristine = template_by_id("kca_certification").expect("registered");
    assert_eq!(pristine.grades.len(), 3);
    assert_eq!(pristine.grades[0].score, 40.0);
}

#[test]
fn experience_template_reads_profile_field() {
    let template = template_by_id("coaching_experience").expect("registered");
    let config = apply_template(item_id("experience"), template);

    assert_eq!(config.value_source(), ValueSource::UserField);
    assert_eq!(config.source_field.as_deref(), Some("coaching_years"));
}

#[test]
fn experience_template_scores_years_as_brackets() {
    let template = template_by_id("coaching_experience").expect("registered");
    let mut config = apply_template(item_id("experience"), template);
    config.finalize(Some(30.0)).expect("template is valid as-is");
    let item = CompetencyItem::new(item_id("experience"), "코칭 경력", 30.0);

    assert_eq!(config.matching_type, Some(MatchingType::Range));
    assert_eq!(evaluate(&item, &config, &[], Some(&coach_profile())), Ok(20.0));

    for (years, expected) in [(0, 0.0), (1, 10.0), (2, 10.0), (4, 20.0), (5, 30.0), (6, 30.0), (12, 30.0)] {
        let profile = UserProfile::new().with_field("coaching_years", years);
        assert_eq!(
            evaluate(&item, &config, &[], Some(&profile)),
            Ok(expected),
            "{years} years"
        );
    }
}

#[test]
fn templates_with_grades_pass_validation() {
    for template in templates().iter().filter(|template| !template.grades.is_empty()) {
        let config = apply_template(item_id(template.id), template);
        let errors = validate(&config, None);
        assert!(
            errors.is_empty(),
            "template {} should validate, got {errors:?}",
            template.id
        );
    }
}
