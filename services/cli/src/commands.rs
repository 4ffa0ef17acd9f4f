use crate::infra::{open, print_json, read_json};
use clap::Args;
use coaching_scoring::config::ScoringSettings;
use coaching_scoring::error::AppError;
use coaching_scoring::scoring::{
    build_scoring_criteria, parse_scoring_criteria, read_submissions, suggest, templates,
    validate, BatchScorer, GradeTemplate, ItemId, ScoreSheet, ScoredItem, ScoringConfig,
    ScoringCriteria, Suggestion, UserProfile,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct TemplatesArgs {
    /// Item name to look up suggestions for
    #[arg(long)]
    pub(crate) item: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Scoring configuration JSON file
    #[arg(long)]
    pub(crate) config: PathBuf,
    /// Item maximum score (defaults to SCORING_MAX_SCORE)
    #[arg(long)]
    pub(crate) max_score: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct BuildCriteriaArgs {
    /// Scoring configuration JSON file
    #[arg(long)]
    pub(crate) config: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ParseCriteriaArgs {
    /// Item the criteria records belong to
    #[arg(long)]
    pub(crate) item_id: String,
    /// JSON array of stored criteria records
    #[arg(long)]
    pub(crate) criteria: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON array of items with their finalized scoring configurations
    #[arg(long)]
    pub(crate) items: PathBuf,
    /// CSV export with applicant_id,item_id,value columns
    #[arg(long)]
    pub(crate) submissions: PathBuf,
    /// JSON object of applicant profiles keyed by applicant id
    #[arg(long)]
    pub(crate) profiles: Option<PathBuf>,
    /// Emit score sheets as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_templates(args: TemplatesArgs) -> Result<(), AppError> {
    let Some(item) = args.item else {
        println!("Scoring templates");
        for template in templates() {
            render_template(template);
        }
        return Ok(());
    };

    match suggest(&item) {
        Suggestion::None => println!("No template matches '{item}'"),
        Suggestion::Apply(template) => {
            println!("Suggested template for '{item}'");
            render_template(template);
        }
        Suggestion::Choose { by_name, by_exists } => {
            println!("'{item}' can be scored by certificate name or by presence; pick one");
            render_template(by_name);
            render_template(by_exists);
        }
    }
    Ok(())
}

fn render_template(template: &GradeTemplate) {
    let mode = template
        .aggregation_mode
        .map(|mode| mode.label())
        .unwrap_or("-");
    println!(
        "  {:<30} {} [{} / {}]",
        template.id,
        template.name,
        template.matching_type.label(),
        mode
    );
    for grade in &template.grades {
        println!(
            "      {:<20} {:>6}{}",
            grade.value.key(),
            grade.score,
            if grade.fixed { "  (locked)" } else { "" }
        );
    }
}

pub(crate) fn run_validate(args: ValidateArgs, settings: &ScoringSettings) -> Result<(), AppError> {
    let config: ScoringConfig = read_json(&args.config)?;
    let max_score = args.max_score.unwrap_or(settings.default_max_score);

    let errors = validate(&config, Some(max_score));
    if errors.is_empty() {
        println!(
            "{}: valid (highest grade score {}, ceiling {})",
            config.item_id,
            config.total_score(),
            max_score
        );
        return Ok(());
    }

    println!("{}: {} problem(s)", config.item_id, errors.len());
    for error in &errors {
        println!("  - {error}");
    }
    Err(AppError::Validation(errors))
}

pub(crate) fn run_build_criteria(args: BuildCriteriaArgs) -> Result<(), AppError> {
    let config: ScoringConfig = read_json(&args.config)?;
    print_json(&build_scoring_criteria(&config))
}

pub(crate) fn run_parse_criteria(args: ParseCriteriaArgs) -> Result<(), AppError> {
    let records: Vec<ScoringCriteria> = read_json(&args.criteria)?;
    match parse_scoring_criteria(ItemId::new(args.item_id), &records) {
        Some(config) => print_json(&config),
        None => {
            println!("No criteria records to parse");
            Ok(())
        }
    }
}

pub(crate) fn run_score(args: ScoreArgs, settings: &ScoringSettings) -> Result<(), AppError> {
    let mut items: Vec<ScoredItem> = read_json(&args.items)?;
    for scored in items.iter_mut().filter(|scored| scored.item.max_score <= 0.0) {
        scored.item.max_score = settings.default_max_score;
    }
    let scorer = BatchScorer::new(items)?;

    let applicants = read_submissions(open(&args.submissions)?)?;
    let profiles: BTreeMap<String, UserProfile> = match &args.profiles {
        Some(path) => read_json(path)?,
        None => BTreeMap::new(),
    };
    info!(
        items = scorer.item_count(),
        applicants = applicants.len(),
        profiles = profiles.len(),
        "scoring submissions"
    );

    let sheets = scorer.score_all(&applicants, &profiles);
    if args.json {
        return print_json(&sheets);
    }

    println!("Score report ({} applicant(s))", sheets.len());
    for sheet in &sheets {
        render_sheet(sheet);
    }
    Ok(())
}

fn render_sheet(sheet: &ScoreSheet) {
    println!("\n{}  total {}", sheet.applicant_id, sheet.total);
    for item in &sheet.items {
        println!("  {:<24} {:>6}  {}", item.item_id.as_str(), item.score, item.notes);
    }
}
