//! Tracing integration for structured logging.
//!
//! Stage transitions are emitted as `tracing` events with `stage` and
//! `action` fields. The on-screen console log is a separate UI sink.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::AppError;

const CRATE_TARGETS: [&str; 5] = [
    "aether_app",
    "aether_upload",
    "aether_ledger",
    "aether_ui",
    "aether_core",
];

/// Maps verbosity (0=error .. 4+=trace) to a level name.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Builds the default filter directive for the workspace crates.
pub fn default_directive(verbosity: u8) -> String {
    let level = level_for(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs a stderr text subscriber. `RUST_LOG` overrides `verbosity`.
///
/// # Errors
/// Returns [`AppError::Logging`] when a global subscriber is already set.
pub fn init_logging(verbosity: u8) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(verbosity >= 3)
                .with_line_number(verbosity >= 3),
        )
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_covers_every_crate() {
        let directive = default_directive(3);
        assert!(directive.contains("aether_app=debug"));
        assert!(directive.contains("aether_ledger=debug"));
        assert_eq!(level_for(0), "error");
        assert_eq!(level_for(9), "trace");
    }
}
