mod policy;
mod rules;
mod source;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    AggregationMode, CompetencyItem, GradeType, ItemId, MatchingType, ScoringConfig, UserProfile,
    ValueSource,
};
use policy::ValueOutcome;
use rules::MatchTarget;

/// Contract violations that `validate` should have rejected before evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidConfigError {
    #[error("item {item_id} has not been configured for scoring")]
    NotConfigured { item_id: ItemId },
    #[error("item {item_id} has no matching type")]
    MissingMatchingType { item_id: ItemId },
    #[error("item {item_id} uses grade matching without a grade type")]
    MissingGradeType { item_id: ItemId },
    #[error("item {item_id} uses grade matching without an aggregation mode")]
    MissingAggregationMode { item_id: ItemId },
    #[error("item {item_id} has an empty grade ladder")]
    EmptyLadder { item_id: ItemId },
    #[error("item {item_id}: aggregation {mode:?} is not allowed for {grade_type:?} values")]
    IllegalAggregation {
        item_id: ItemId,
        grade_type: GradeType,
        mode: AggregationMode,
    },
    #[error("item {item_id} reads from {value_source} but names no source field")]
    MissingSourceField {
        item_id: ItemId,
        value_source: ValueSource,
    },
    #[error("item {item_id} reads a JSON field but has no extract path")]
    MissingExtractPath { item_id: ItemId },
    #[error("item {item_id} has no expected value to compare against")]
    MissingExpectedValue { item_id: ItemId },
    #[error("item {item_id} has an invalid range bound '{expression}'")]
    InvalidRange { item_id: ItemId, expression: String },
}

/// Score awarded to one item, with the values that earned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    pub item_id: ItemId,
    pub score: f64,
    pub matched: Vec<String>,
    pub notes: String,
}

/// Evaluator bound to one item and its finalized scoring policy.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    item: CompetencyItem,
    config: ScoringConfig,
    target: MatchTarget,
    mode: AggregationMode,
}

impl ScoringEngine {
    pub fn new(item: CompetencyItem, config: ScoringConfig) -> Result<Self, InvalidConfigError> {
        let target = preflight(&item, &config)?;
        let mode = config.aggregation_mode.unwrap_or(AggregationMode::AnyMatch);

        Ok(Self {
            item,
            config,
            target,
            mode,
        })
    }

    pub fn item(&self) -> &CompetencyItem {
        &self.item
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, submitted: &[String], profile: Option<&UserProfile>) -> ItemScore {
        let candidates = source::candidate_values(&self.config, submitted, profile);
        if candidates.is_empty() {
            debug!(item_id = %self.item.item_id, "no candidate values; scoring zero");
            return ItemScore {
                item_id: self.item.item_id.clone(),
                score: 0.0,
                matched: Vec::new(),
                notes: "no value provided".to_string(),
            };
        }

        let outcomes: Vec<ValueOutcome<'_>> = candidates
            .iter()
            .map(|raw| ValueOutcome {
                raw: raw.as_str(),
                matched: self.target.score_value(raw, self.item.max_score),
            })
            .collect();
        let aggregate = policy::aggregate(self.mode, &outcomes, self.item.max_score);

        debug!(
            item_id = %self.item.item_id,
            candidates = candidates.len(),
            mode = self.mode.label(),
            score = aggregate.score,
            "item evaluated"
        );

        ItemScore {
            item_id: self.item.item_id.clone(),
            score: aggregate.score,
            matched: aggregate.matched,
            notes: aggregate.notes,
        }
    }
}

/// Score the submitted values (or profile value) for one item.
pub fn evaluate(
    item: &CompetencyItem,
    config: &ScoringConfig,
    submitted: &[String],
    profile: Option<&UserProfile>,
) -> Result<f64, InvalidConfigError> {
    let engine = ScoringEngine::new(item.clone(), config.clone())?;
    Ok(engine.score(submitted, profile).score)
}

fn preflight(item: &CompetencyItem, config: &ScoringConfig) -> Result<MatchTarget, InvalidConfigError> {
    let item_id = || config.item_id.clone();

    if !config.configured {
        return Err(InvalidConfigError::NotConfigured { item_id: item_id() });
    }

    let matching_type = config
        .matching_type
        .ok_or_else(|| InvalidConfigError::MissingMatchingType { item_id: item_id() })?;

    let source = config.value_source();
    if source.requires_source_field() && is_blank(config.source_field.as_deref()) {
        return Err(InvalidConfigError::MissingSourceField {
            item_id: item_id(),
            value_source: source,
        });
    }
    if source == ValueSource::JsonField && is_blank(config.extract_pattern.as_deref()) {
        return Err(InvalidConfigError::MissingExtractPath { item_id: item_id() });
    }

    if let (Some(grade_type), Some(mode)) = (config.grade_type, config.aggregation_mode) {
        if !grade_type.allows(mode) {
            return Err(InvalidConfigError::IllegalAggregation {
                item_id: item_id(),
                grade_type,
                mode,
            });
        }
    }

    let expected = || {
        item.expected_value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| InvalidConfigError::MissingExpectedValue { item_id: item_id() })
    };

    match matching_type {
        MatchingType::Exact => Ok(MatchTarget::Exact(expected()?)),
        MatchingType::Contains => Ok(MatchTarget::Contains(expected()?)),
        MatchingType::Range if config.grade_mappings.is_empty() => {
            let expression = expected()?;
            rules::parse_interval(&expression)
                .map(MatchTarget::Interval)
                .ok_or(InvalidConfigError::InvalidRange {
                    item_id: item_id(),
                    expression,
                })
        }
        MatchingType::Range => rules::brackets(&config.grade_mappings)
            .map(MatchTarget::Brackets)
            .map_err(|expression| InvalidConfigError::InvalidRange {
                item_id: item_id(),
                expression,
            }),
        MatchingType::Grade => {
            let grade_type = config
                .grade_type
                .ok_or_else(|| InvalidConfigError::MissingGradeType { item_id: item_id() })?;
            if config.aggregation_mode.is_none() {
                return Err(InvalidConfigError::MissingAggregationMode { item_id: item_id() });
            }
            if config.grade_mappings.is_empty() {
                return Err(InvalidConfigError::EmptyLadder { item_id: item_id() });
            }
            Ok(MatchTarget::Grade {
                grade_type,
                rungs: config.grade_mappings.clone(),
            })
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|value| value.trim().is_empty()).unwrap_or(true)
}
