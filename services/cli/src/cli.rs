use crate::commands::{
    run_build_criteria, run_parse_criteria, run_score, run_templates, run_validate,
    BuildCriteriaArgs, ParseCriteriaArgs, ScoreArgs, TemplatesArgs, ValidateArgs,
};
use clap::{Parser, Subcommand};
use coaching_scoring::config::AppConfig;
use coaching_scoring::error::AppError;
use coaching_scoring::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "Coaching Scoring",
    about = "Configure, validate, and apply competency scoring policies from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the template catalog, or the suggestions for an item name
    Templates(TemplatesArgs),
    /// Check a scoring configuration and report every problem found
    Validate(ValidateArgs),
    /// Convert between scoring configurations and stored criteria records
    Criteria {
        #[command(subcommand)]
        command: CriteriaCommand,
    },
    /// Score exported applicant submissions against finalized items
    Score(ScoreArgs),
}

#[derive(Subcommand, Debug)]
enum CriteriaCommand {
    /// Encode a scoring configuration as criteria records
    Build(BuildCriteriaArgs),
    /// Rebuild a scoring configuration from criteria records
    Parse(ParseCriteriaArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Templates(args) => run_templates(args),
        Command::Validate(args) => run_validate(args, &config.scoring),
        Command::Criteria {
            command: CriteriaCommand::Build(args),
        } => run_build_criteria(args),
        Command::Criteria {
            command: CriteriaCommand::Parse(args),
        } => run_parse_criteria(args),
        Command::Score(args) => run_score(args, &config.scoring),
    }
}
