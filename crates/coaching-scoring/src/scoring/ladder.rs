use super::domain::{format_number, GradeMapping, GradeValue, ScoringConfig};

/// Rejected edits against a grade ladder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LadderEditError {
    #[error("grade {index} does not exist")]
    OutOfRange { index: usize },
    #[error("grade '{value}' comes from the template and cannot be changed or removed")]
    Locked { value: String },
    #[error("grade value '{value}' is already on the ladder")]
    DuplicateValue { value: String },
    #[error("grade score must be zero or greater (found {score})")]
    NegativeScore { score: String },
    #[error("this item does not allow additional grades")]
    AddingDisabled,
}

/// A rung as seen by the editor: template rungs are locked, administrator rungs are free.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeEntry {
    Locked(GradeMapping),
    Free(GradeMapping),
}

impl GradeEntry {
    fn from_mapping(mapping: GradeMapping) -> Self {
        if mapping.fixed {
            Self::Locked(mapping)
        } else {
            Self::Free(mapping)
        }
    }

    pub fn mapping(&self) -> &GradeMapping {
        match self {
            GradeEntry::Locked(mapping) | GradeEntry::Free(mapping) => mapping,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, GradeEntry::Locked(_))
    }

    fn into_mapping(self) -> GradeMapping {
        match self {
            GradeEntry::Locked(mut mapping) => {
                mapping.fixed = true;
                mapping
            }
            GradeEntry::Free(mut mapping) => {
                mapping.fixed = false;
                mapping
            }
        }
    }
}

/// Editable view over a config's grade mappings.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeLadder {
    entries: Vec<GradeEntry>,
    allow_add: bool,
}

impl GradeLadder {
    pub fn new(mappings: Vec<GradeMapping>, allow_add: bool) -> Self {
        Self {
            entries: mappings.into_iter().map(GradeEntry::from_mapping).collect(),
            allow_add,
        }
    }

    pub fn entries(&self) -> &[GradeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_score(&mut self, index: usize, score: f64) -> Result<(), LadderEditError> {
        if score.is_nan() || score < 0.0 {
            return Err(LadderEditError::NegativeScore {
                score: format_number(score),
            });
        }

        match self.entry_mut(index)? {
            GradeEntry::Locked(mapping) | GradeEntry::Free(mapping) => mapping.score = score,
        }
        Ok(())
    }

    pub fn set_value(&mut self, index: usize, value: GradeValue) -> Result<(), LadderEditError> {
        self.free_mut(index)?;
        self.ensure_unique(&value, Some(index))?;
        self.free_mut(index)?.value = value;
        Ok(())
    }

    pub fn set_label(&mut self, index: usize, label: Option<String>) -> Result<(), LadderEditError> {
        self.free_mut(index)?.label = label;
        Ok(())
    }

    /// Append an administrator rung; it is always editable.
    pub fn add(&mut self, mapping: GradeMapping) -> Result<(), LadderEditError> {
        if !self.allow_add {
            return Err(LadderEditError::AddingDisabled);
        }
        if mapping.score.is_nan() || mapping.score < 0.0 {
            return Err(LadderEditError::NegativeScore {
                score: format_number(mapping.score),
            });
        }
        self.ensure_unique(&mapping.value, None)?;

        self.entries.push(GradeEntry::Free(GradeMapping {
            fixed: false,
            ..mapping
        }));
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<GradeMapping, LadderEditError> {
        self.free_mut(index)?;
        Ok(self.entries.remove(index).into_mapping())
    }

    pub fn into_mappings(self) -> Vec<GradeMapping> {
        self.entries
            .into_iter()
            .map(GradeEntry::into_mapping)
            .collect()
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut GradeEntry, LadderEditError> {
        self.entries
            .get_mut(index)
            .ok_or(LadderEditError::OutOfRange { index })
    }

    fn free_mut(&mut self, index: usize) -> Result<&mut GradeMapping, LadderEditError> {
        match self.entry_mut(index)? {
            GradeEntry::Free(mapping) => Ok(mapping),
            GradeEntry::Locked(mapping) => Err(LadderEditError::Locked {
                value: mapping.value.key(),
            }),
        }
    }

    fn ensure_unique(&self, value: &GradeValue, skip: Option<usize>) -> Result<(), LadderEditError> {
        let key = value.key();
        let taken = self
            .entries
            .iter()
            .enumerate()
            .any(|(index, entry)| Some(index) != skip && entry.mapping().value.key() == key);

        if taken {
            Err(LadderEditError::DuplicateValue { value: key })
        } else {
            Ok(())
        }
    }
}

impl ScoringConfig {
    pub fn ladder(&self) -> GradeLadder {
        GradeLadder::new(self.grade_mappings.clone(), self.allow_add_grades)
    }

    /// Store an edited ladder; any edit requires the policy to be finalized again.
    pub fn replace_ladder(&mut self, ladder: GradeLadder) {
        self.grade_mappings = ladder.into_mappings();
        self.configured = false;
    }
}
