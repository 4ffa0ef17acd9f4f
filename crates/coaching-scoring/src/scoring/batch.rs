//! Scoring many applicants at once from exported submissions.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use super::domain::{CompetencyItem, ItemId, ScoringConfig, UserProfile};
use super::evaluation::{InvalidConfigError, ItemScore, ScoringEngine};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read batch input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid submissions CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid scoring definition JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scoring definition for item {item_id} cannot be evaluated: {reason}")]
    Item {
        item_id: ItemId,
        reason: InvalidConfigError,
    },
}

/// An item definition paired with its finalized scoring policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: CompetencyItem,
    pub config: ScoringConfig,
}

/// Every value one applicant submitted, grouped by item in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicantSubmissions {
    pub applicant_id: String,
    pub values: BTreeMap<ItemId, Vec<String>>,
}

/// Per-applicant result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub applicant_id: String,
    pub items: Vec<ItemScore>,
    pub total: f64,
}

#[derive(Debug, Deserialize)]
struct SubmissionRow {
    applicant_id: String,
    item_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
}

/// Read `applicant_id,item_id,value` rows; applicants keep their first-seen order.
pub fn read_submissions<R: Read>(reader: R) -> Result<Vec<ApplicantSubmissions>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut applicants: Vec<ApplicantSubmissions> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in csv_reader.deserialize::<SubmissionRow>() {
        let row = record?;
        let position = *positions.entry(row.applicant_id.clone()).or_insert_with(|| {
            applicants.push(ApplicantSubmissions {
                applicant_id: row.applicant_id.clone(),
                values: BTreeMap::new(),
            });
            applicants.len() - 1
        });

        let values = applicants[position]
            .values
            .entry(ItemId::new(row.item_id))
            .or_default();
        if let Some(value) = row.value {
            values.push(value);
        }
    }

    Ok(applicants)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Evaluates a fixed set of items for any number of applicants.
#[derive(Debug, Clone)]
pub struct BatchScorer {
    engines: Vec<ScoringEngine>,
}

impl BatchScorer {
    pub fn new(items: Vec<ScoredItem>) -> Result<Self, BatchError> {
        let engines = items
            .into_iter()
            .map(|scored| {
                let item_id = scored.item.item_id.clone();
                ScoringEngine::new(scored.item, scored.config)
                    .map_err(|reason| BatchError::Item { item_id, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { engines })
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, BatchError> {
        let items: Vec<ScoredItem> = serde_json::from_reader(reader)?;
        Self::new(items)
    }

    pub fn item_count(&self) -> usize {
        self.engines.len()
    }

    pub fn score(&self, submissions: &ApplicantSubmissions, profile: Option<&UserProfile>) -> ScoreSheet {
        for item_id in submissions.values.keys() {
            if !self.engines.iter().any(|engine| &engine.item().item_id == item_id) {
                warn!(
                    applicant_id = %submissions.applicant_id,
                    item_id = %item_id,
                    "submission references an unknown item; ignoring"
                );
            }
        }

        let items: Vec<ItemScore> = self
            .engines
            .iter()
            .map(|engine| {
                let values = submissions
                    .values
                    .get(&engine.item().item_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                engine.score(values, profile)
            })
            .collect();
        let total: f64 = items.iter().map(|item| item.score).sum();

        ScoreSheet {
            applicant_id: submissions.applicant_id.clone(),
            items,
            total,
        }
    }

    /// Score every applicant in the export, then every profiled applicant who submitted nothing.
    ///
    /// Profile-only applicants still earn points on items sourced from their profile.
    pub fn score_all(
        &self,
        applicants: &[ApplicantSubmissions],
        profiles: &BTreeMap<String, UserProfile>,
    ) -> Vec<ScoreSheet> {
        let mut sheets: Vec<ScoreSheet> = applicants
            .iter()
            .map(|applicant| self.score(applicant, profiles.get(&applicant.applicant_id)))
            .collect();

        let submitted: HashSet<&str> = applicants
            .iter()
            .map(|applicant| applicant.applicant_id.as_str())
            .collect();
        let profile_only: Vec<ScoreSheet> = profiles
            .iter()
            .filter(|(applicant_id, _)| !submitted.contains(applicant_id.as_str()))
            .map(|(applicant_id, profile)| {
                let empty = ApplicantSubmissions {
                    applicant_id: applicant_id.clone(),
                    values: BTreeMap::new(),
                };
                self.score(&empty, Some(profile))
            })
            .collect();
        if !profile_only.is_empty() {
            warn!(
                applicants = profile_only.len(),
                "profiled applicants have no submissions; scoring profile fields only"
            );
        }
        sheets.extend(profile_only);

        info!(
            applicants = sheets.len(),
            items = self.engines.len(),
            "batch scoring complete"
        );
        sheets
    }
}
