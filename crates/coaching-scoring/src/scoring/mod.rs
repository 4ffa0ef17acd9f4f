//! Competency-item scoring: template catalog, policy model, validation, the stored criteria
//! form, and evaluation of applicant values against a finalized policy.

pub mod batch;
pub mod catalog;
pub mod criteria;
pub mod domain;
mod evaluation;
pub mod ladder;
pub mod validation;

#[cfg(test)]
mod tests;

pub use batch::{
    read_submissions, ApplicantSubmissions, BatchError, BatchScorer, ScoreSheet, ScoredItem,
};
pub use catalog::{
    apply_template, suggest, suggested_templates, template_by_id, templates, ChoiceTag,
    GradeTemplate, Suggestion, TemplateFamily,
};
pub use criteria::{build_scoring_criteria, parse_scoring_criteria, ScoringCriteria};
pub use domain::{
    calculate_total_score, scoring_config_summary, sort_grade_mappings_by_score, AggregationMode,
    CompetencyItem, GradeMapping, GradeType, GradeValue, ItemId, MatchingType, ProofRequirement,
    ScoringConfig, UserProfile, ValueSource, NOT_CONFIGURED_SUMMARY,
};
pub use evaluation::{evaluate, InvalidConfigError, ItemScore, ScoringEngine};
pub use ladder::{GradeEntry, GradeLadder, LadderEditError};
pub use validation::{is_valid, validate};
