mod cli;
mod commands;
mod infra;

use coaching_scoring::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
