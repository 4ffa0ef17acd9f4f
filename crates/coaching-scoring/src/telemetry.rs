use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Crates whose events a bare `APP_LOG_LEVEL` such as `debug` applies to.
const SCORING_TARGETS: [&str; 2] = ["coaching_scoring", "coaching_scoring_cli"];

/// Level for everything outside the scoring crates (csv, clap, and so on).
const DEPENDENCY_LEVEL: &str = "warn";

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "APP_LOG_LEVEL '{value}' is not a valid level or filter")
            }
            TelemetryError::Subscriber(err) => write!(f, "could not install subscriber: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Expand a bare level into a filter scoped to the scoring crates.
///
/// Anything that already looks like a filter (`target=level`, or a comma separated list) is
/// passed through untouched.
pub fn filter_directive(log_level: &str) -> String {
    let log_level = log_level.trim();
    if log_level.contains('=') || log_level.contains(',') {
        return log_level.to_string();
    }

    let mut directive = DEPENDENCY_LEVEL.to_string();
    for target in SCORING_TARGETS {
        directive.push_str(&format!(",{target}={log_level}"));
    }
    directive
}

fn configured_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(filter_directive(&config.log_level)).map_err(|source| {
        TelemetryError::EnvFilter {
            value: config.log_level.clone(),
            source,
        }
    })
}

/// Install the global subscriber; `RUST_LOG` takes precedence over `APP_LOG_LEVEL`.
///
/// Batch runs log per-item decisions, so targets stay visible. Output goes to stderr so score
/// sheets on stdout stay machine readable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(config)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telemetry(log_level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: log_level.to_string(),
        }
    }

    #[test]
    fn bare_level_is_scoped_to_scoring_crates() {
        assert_eq!(
            filter_directive(" debug "),
            "warn,coaching_scoring=debug,coaching_scoring_cli=debug"
        );
    }

    #[test]
    fn explicit_filters_pass_through() {
        assert_eq!(
            filter_directive("coaching_scoring::scoring=trace"),
            "coaching_scoring::scoring=trace"
        );
        assert_eq!(filter_directive("info,csv=debug"), "info,csv=debug");
    }

    #[test]
    fn configured_level_builds_a_filter() {
        assert!(configured_filter(&telemetry("info")).is_ok());
    }

    #[test]
    fn malformed_level_is_reported_with_its_value() {
        match configured_filter(&telemetry("coaching_scoring=loud")) {
            Err(err @ TelemetryError::EnvFilter { .. }) => {
                assert!(err.to_string().contains("coaching_scoring=loud"));
            }
            other => panic!("expected an env filter error, got {other:?}"),
        }
    }
}
