use crate::scoring::domain::{
    AggregationMode, CompetencyItem, GradeMapping, GradeType, ItemId, MatchingType,
    ScoringConfig, UserProfile, ValueSource,
};

pub(super) fn item_id(value: &str) -> ItemId {
    ItemId::new(value)
}

pub(super) fn certification_item() -> CompetencyItem {
    CompetencyItem::new(item_id("kca-cert"), "KCA 코칭 자격증", 50.0)
}

pub(super) fn certification_ladder() -> Vec<GradeMapping> {
    vec![
        GradeMapping::new("KSC", 40.0),
        GradeMapping::new("KAC", 30.0),
        GradeMapping::new("KPC", 20.0),
    ]
}

pub(super) fn grade_config(
    id: &str,
    grade_type: GradeType,
    mode: AggregationMode,
    mappings: Vec<GradeMapping>,
) -> ScoringConfig {
    let mut config = ScoringConfig::new(item_id(id));
    config.matching_type = Some(MatchingType::Grade);
    config.grade_type = Some(grade_type);
    config.aggregation_mode = Some(mode);
    config.value_source = Some(ValueSource::Submitted);
    config.grade_mappings = mappings;
    config
}

/// Finalized best-match policy over the KCA grades.
pub(super) fn certification_config() -> ScoringConfig {
    let mut config = grade_config(
        "kca-cert",
        GradeType::String,
        AggregationMode::BestMatch,
        certification_ladder(),
    );
    config
        .finalize(Some(50.0))
        .expect("certification ladder is valid");
    config
}

pub(super) fn scalar_config(id: &str, matching_type: MatchingType) -> ScoringConfig {
    let mut config = ScoringConfig::new(item_id(id));
    config.matching_type = Some(matching_type);
    config.value_source = Some(ValueSource::Submitted);
    config.configured = true;
    config
}

pub(super) fn presence_ladder(exists: f64) -> Vec<GradeMapping> {
    vec![GradeMapping::new("exists", exists), GradeMapping::new("none", 0.0)]
}

pub(super) fn values(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|value| value.to_string()).collect()
}

pub(super) fn coach_profile() -> UserProfile {
    UserProfile::new()
        .with_field("coaching_years", 4)
        .with_field(
            "credentials",
            r#"{"certs":[{"name":"KPC","year":2019},{"name":"KAC","year":2023}]}"#,
        )
}
