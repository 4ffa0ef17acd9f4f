//! End-to-end scoring workflow through the public API: suggest a template, tune it, finalize,
//! store it as criteria, restore it, and score applicants.

mod common {
    use coaching_scoring::scoring::{CompetencyItem, ItemId};

    pub(super) fn item(id: &str, name: &str, max_score: f64) -> CompetencyItem {
        CompetencyItem::new(ItemId::new(id), name, max_score)
    }

    pub(super) fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }
}

use std::collections::BTreeMap;

use coaching_scoring::error::AppError;
use coaching_scoring::scoring::{
    apply_template, build_scoring_criteria, parse_scoring_criteria, read_submissions, suggest,
    template_by_id, BatchScorer, GradeMapping, ScoredItem, ScoringCriteria, ScoringEngine,
    Suggestion, UserProfile,
};
use common::*;

#[test]
fn suggested_template_survives_storage_and_scores() {
    let item = item("kca", "KCA 코칭 자격 등급", 45.0);
    let template = match suggest(&item.name) {
        Suggestion::Apply(template) => template,
        other => panic!("expected a direct suggestion, got {other:?}"),
    };

    let mut config = apply_template(item.item_id.clone(), template);
    let mut ladder = config.ladder();
    ladder.set_score(0, 45.0).expect("score edit");
    config.replace_ladder(ladder);
    config.finalize(Some(item.max_score)).expect("valid");

    let stored = serde_json::to_string(&build_scoring_criteria(&config)).expect("serializes");
    let restored_records: Vec<ScoringCriteria> = serde_json::from_str(&stored).expect("parses");
    let restored =
        parse_scoring_criteria(item.item_id.clone(), &restored_records).expect("restores");

    let engine = ScoringEngine::new(item, restored).expect("restored policy is usable");
    assert_eq!(engine.score(&values(&["KPC", "KSC"]), None).score, 45.0);
    assert_eq!(engine.score(&values(&["KAC"]), None).score, 30.0);
    assert_eq!(engine.score(&[], None).score, 0.0);
}

#[test]
fn choosing_presence_scoring_for_counseling() {
    let item = item("counsel", "상담 자격 보유", 10.0);
    let template = match suggest(&item.name) {
        Suggestion::Choose { by_exists, .. } => by_exists,
        other => panic!("expected a choice, got {other:?}"),
    };

    let mut config = apply_template(item.item_id.clone(), template);
    config.finalize(Some(item.max_score)).expect("valid");

    let engine = ScoringEngine::new(item, config).expect("usable");
    assert_eq!(engine.score(&values(&["uploads/counsel.pdf"]), None).score, 10.0);
    assert_eq!(engine.score(&values(&["없음"]), None).score, 0.0);
}

#[test]
fn rejected_policy_converts_into_app_error() {
    let item = item("other", "기타 자격증", 5.0);
    let template = match suggest(&item.name) {
        Suggestion::Choose { by_name, .. } => by_name,
        other => panic!("expected a choice, got {other:?}"),
    };

    let mut config = apply_template(item.item_id.clone(), template);
    let err = config
        .finalize(Some(item.max_score))
        .map_err(AppError::Validation)
        .expect_err("empty ladder rejected");

    assert!(err.to_string().contains("at least one grade mapping is required"));

    let mut ladder = config.ladder();
    ladder
        .add(GradeMapping::new("정리수납전문가", 5.0))
        .expect("adding allowed");
    config.replace_ladder(ladder);
    config.finalize(Some(item.max_score)).expect("valid now");
}

#[test]
fn batch_run_from_csv() {
    let kca = item("kca", "KCA 코칭 자격", 40.0);
    let mut config = apply_template(
        kca.item_id.clone(),
        template_by_id("kca_certification").expect("registered"),
    );
    config.finalize(Some(kca.max_score)).expect("valid");

    let scorer = BatchScorer::new(vec![ScoredItem { item: kca, config }]).expect("scorer");
    let applicants = read_submissions(
        "applicant_id,item_id,value\nP-1,kca,KAC\nP-2,kca,KSC\nP-2,kca,KPC\n".as_bytes(),
    )
    .expect("csv parses");

    let sheets = scorer.score_all(&applicants, &BTreeMap::<String, UserProfile>::new());
    let totals: Vec<(String, f64)> = sheets
        .into_iter()
        .map(|sheet| (sheet.applicant_id, sheet.total))
        .collect();

    assert_eq!(
        totals,
        vec![("P-1".to_string(), 30.0), ("P-2".to_string(), 40.0)]
    );
}
