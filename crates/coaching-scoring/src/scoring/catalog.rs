use std::sync::OnceLock;

use serde::Serialize;

use super::domain::{
    AggregationMode, GradeMapping, GradeType, ItemId, MatchingType, ProofRequirement,
    ScoringConfig, ValueSource,
};

static CATALOG: OnceLock<Vec<GradeTemplate>> = OnceLock::new();

/// Competency families a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateFamily {
    CoachingCertification,
    Education,
    CoachingExperience,
    Counseling,
    OtherCertification,
    CoachingField,
    Training,
}

/// Which side of a two-template family a template represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceTag {
    ByName,
    ByExists,
}

/// Immutable scoring preset offered for items whose names match its keywords.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub family: TemplateFamily,
    pub choice: Option<ChoiceTag>,
    pub keywords: &'static [&'static str],
    pub matching_type: MatchingType,
    pub grade_type: Option<GradeType>,
    pub value_source: ValueSource,
    pub source_field: Option<&'static str>,
    pub aggregation_mode: Option<AggregationMode>,
    pub grades: Vec<GradeMapping>,
    pub fixed_grades: bool,
    pub allow_add_grades: bool,
    pub proof_required: ProofRequirement,
    pub verification_note: Option<&'static str>,
}

impl GradeTemplate {
    /// Set when the administrator must pick between this template and its counterpart.
    pub fn needs_choice(&self) -> Option<ChoiceTag> {
        self.choice
    }

    fn matches(&self, lowered_name: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered_name.contains(&keyword.to_lowercase()))
    }

    /// The other template of a two-way family, if this template has one.
    pub fn counterpart(&self) -> Option<&'static GradeTemplate> {
        let choice = self.choice?;
        templates()
            .iter()
            .find(|other| other.family == self.family && other.choice.is_some_and(|tag| tag != choice))
    }
}

/// Outcome of looking up templates for an item name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suggestion {
    None,
    Apply(&'static GradeTemplate),
    Choose {
        by_name: &'static GradeTemplate,
        by_exists: &'static GradeTemplate,
    },
}

pub fn templates() -> &'static [GradeTemplate] {
    CATALOG.get_or_init(build_catalog)
}

/// Templates whose keywords occur in the item name, in registration order.
pub fn suggested_templates(item_name: &str) -> Vec<&'static GradeTemplate> {
    let lowered = item_name.to_lowercase();
    templates()
        .iter()
        .filter(|template| template.matches(&lowered))
        .collect()
}

pub fn template_by_id(id: &str) -> Option<&'static GradeTemplate> {
    templates().iter().find(|template| template.id == id)
}

/// Classify the first suggestion so the host workflow knows whether to ask first.
pub fn suggest(item_name: &str) -> Suggestion {
    let Some(first) = suggested_templates(item_name).into_iter().next() else {
        return Suggestion::None;
    };

    match (first.needs_choice(), first.counterpart()) {
        (Some(ChoiceTag::ByName), Some(other)) => Suggestion::Choose {
            by_name: first,
            by_exists: other,
        },
        (Some(ChoiceTag::ByExists), Some(other)) => Suggestion::Choose {
            by_name: other,
            by_exists: first,
        },
        _ => Suggestion::Apply(first),
    }
}

/// Copy a template into a fresh, unconfigured policy for the item.
pub fn apply_template(item_id: ItemId, template: &GradeTemplate) -> ScoringConfig {
    ScoringConfig {
        item_id,
        matching_type: Some(template.matching_type),
        grade_type: template.grade_type,
        value_source: Some(template.value_source),
        source_field: template.source_field.map(str::to_string),
        extract_pattern: None,
        aggregation_mode: template.aggregation_mode,
        grade_mappings: template.grades.clone(),
        configured: false,
        fixed_grades: template.fixed_grades,
        allow_add_grades: template.allow_add_grades,
        proof_required: template.proof_required,
        verification_note: template.verification_note.map(str::to_string),
    }
}

fn rung(value: &str, score: f64, label: &str) -> GradeMapping {
    GradeMapping::new(value, score).with_label(label)
}

fn numeric_rung(value: f64, score: f64, label: &str) -> GradeMapping {
    GradeMapping::new(value, score).with_label(label)
}

fn lock(grades: Vec<GradeMapping>) -> Vec<GradeMapping> {
    grades.into_iter().map(GradeMapping::locked).collect()
}

fn presence_grades(exists: f64) -> Vec<GradeMapping> {
    lock(vec![rung("exists", exists, "있음"), rung("none", 0.0, "없음")])
}

const COUNSELING_KEYWORDS: &[&str] = &["상담", "심리치료", "counseling", "psychotherapy"];
const OTHER_CERTIFICATION_KEYWORDS: &[&str] =
    &["기타 자격", "자격증", "certificate", "certification"];

fn build_catalog() -> Vec<GradeTemplate> {
    vec![
        GradeTemplate {
            id: "kca_certification",
            name: "KCA 코칭 자격증",
            family: TemplateFamily::CoachingCertification,
            choice: None,
            keywords: &["코칭 자격", "코치 자격", "kca", "ksc", "kac", "kpc"],
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::String),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::BestMatch),
            grades: lock(vec![
                rung("KSC", 40.0, "KSC (Korea Supervisor Coach)"),
                rung("KAC", 30.0, "KAC (Korea Associate Coach)"),
                rung("KPC", 20.0, "KPC (Korea Professional Coach)"),
            ]),
            fixed_grades: true,
            allow_add_grades: false,
            proof_required: ProofRequirement::Required,
            verification_note: Some("Confirm the grade on the KCA certificate copy."),
        },
        GradeTemplate {
            id: "icf_certification",
            name: "ICF 코칭 자격증",
            family: TemplateFamily::CoachingCertification,
            choice: None,
            keywords: &["icf", "국제코칭"],
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::String),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::BestMatch),
            grades: lock(vec![
                rung("MCC", 40.0, "MCC (Master Certified Coach)"),
                rung("PCC", 30.0, "PCC (Professional Certified Coach)"),
                rung("ACC", 20.0, "ACC (Associate Certified Coach)"),
            ]),
            fixed_grades: true,
            allow_add_grades: false,
            proof_required: ProofRequirement::Required,
            verification_note: Some("Check the credential in the ICF directory."),
        },
        GradeTemplate {
            id: "education_degree",
            name: "최종 학력",
            family: TemplateFamily::Education,
            choice: None,
            keywords: &["학력", "학위", "degree"],
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::String),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::BestMatch),
            grades: lock(vec![
                rung("박사", 30.0, "Doctorate"),
                rung("석사", 20.0, "Master's"),
                rung("학사", 10.0, "Bachelor's"),
            ]),
            fixed_grades: true,
            allow_add_grades: false,
            proof_required: ProofRequirement::Required,
            verification_note: Some("Degree certificate or transcript."),
        },
        GradeTemplate {
            id: "coaching_experience",
            name: "코칭 경력 (년)",
            family: TemplateFamily::CoachingExperience,
            choice: None,
            keywords: &["코칭 경력", "코칭 경험", "경력 연수"],
            matching_type: MatchingType::Range,
            grade_type: Some(GradeType::Numeric),
            value_source: ValueSource::UserField,
            source_field: Some("coaching_years"),
            aggregation_mode: Some(AggregationMode::BestMatch),
            grades: vec![
                numeric_rung(5.0, 30.0, "5+ years"),
                numeric_rung(3.0, 20.0, "3+ years"),
                numeric_rung(1.0, 10.0, "1+ years"),
            ],
            fixed_grades: false,
            allow_add_grades: true,
            proof_required: ProofRequirement::Optional,
            verification_note: None,
        },
        GradeTemplate {
            id: "counseling_by_name",
            name: "상담/심리치료 자격 (자격명 기준)",
            family: TemplateFamily::Counseling,
            choice: Some(ChoiceTag::ByName),
            keywords: COUNSELING_KEYWORDS,
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::String),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::AnyMatch),
            grades: vec![
                rung("임상심리전문가", 20.0, "Clinical psychologist"),
                rung("상담심리사 1급", 20.0, "Counseling psychologist, level 1"),
                rung("상담심리사 2급", 10.0, "Counseling psychologist, level 2"),
            ],
            fixed_grades: false,
            allow_add_grades: true,
            proof_required: ProofRequirement::Required,
            verification_note: Some("Certificate must name the issuing association."),
        },
        GradeTemplate {
            id: "counseling_by_exists",
            name: "상담/심리치료 자격 (보유 여부 기준)",
            family: TemplateFamily::Counseling,
            choice: Some(ChoiceTag::ByExists),
            keywords: COUNSELING_KEYWORDS,
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::FileExists),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::First),
            grades: presence_grades(10.0),
            fixed_grades: true,
            allow_add_grades: false,
            proof_required: ProofRequirement::Required,
            verification_note: None,
        },
        GradeTemplate {
            id: "other_certification_by_name",
            name: "기타 자격증 (자격명 기준)",
            family: TemplateFamily::OtherCertification,
            choice: Some(ChoiceTag::ByName),
            keywords: OTHER_CERTIFICATION_KEYWORDS,
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::String),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::AnyMatch),
            grades: Vec::new(),
            fixed_grades: false,
            allow_add_grades: true,
            proof_required: ProofRequirement::Optional,
            verification_note: None,
        },
        GradeTemplate {
            id: "other_certification_by_exists",
            name: "기타 자격증 (보유 여부 기준)",
            family: TemplateFamily::OtherCertification,
            choice: Some(ChoiceTag::ByExists),
            keywords: OTHER_CERTIFICATION_KEYWORDS,
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::FileExists),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::First),
            grades: presence_grades(5.0),
            fixed_grades: true,
            allow_add_grades: false,
            proof_required: ProofRequirement::Optional,
            verification_note: None,
        },
        GradeTemplate {
            id: "coaching_fields",
            name: "코칭 전문 분야",
            family: TemplateFamily::CoachingField,
            choice: None,
            keywords: &["코칭 분야", "전문 분야", "specialty"],
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::MultiSelect),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::Count),
            grades: vec![
                rung("비즈니스 코칭", 5.0, "Business coaching"),
                rung("커리어 코칭", 5.0, "Career coaching"),
                rung("라이프 코칭", 5.0, "Life coaching"),
                rung("리더십 코칭", 5.0, "Leadership coaching"),
            ],
            fixed_grades: false,
            allow_add_grades: true,
            proof_required: ProofRequirement::NotRequired,
            verification_note: None,
        },
        GradeTemplate {
            id: "training_completion",
            name: "코칭 교육 이수",
            family: TemplateFamily::Training,
            choice: None,
            keywords: &["교육 이수", "수료", "training"],
            matching_type: MatchingType::Grade,
            grade_type: Some(GradeType::FileExists),
            value_source: ValueSource::Submitted,
            source_field: None,
            aggregation_mode: Some(AggregationMode::First),
            grades: presence_grades(10.0),
            fixed_grades: true,
            allow_add_grades: false,
            proof_required: ProofRequirement::Required,
            verification_note: Some("Completion certificate from the training provider."),
        },
    ]
}
