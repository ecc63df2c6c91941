use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Translate repeated `-v` flags into a tracing level, `None` meaning quiet.
const fn get_verbosity_level(verbosity: u8) -> Option<tracing::Level> {
    match verbosity {
        0 => None,
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}

/// CLI front door: parses arguments, wires up telemetry, and hands back the
/// `Action` for the binary to execute.
///
/// # Errors
///
/// Returns an error when parsing, telemetry setup, or dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    // Telemetry comes up before dispatch so dispatch failures get logged.
    let verbosity_level = get_verbosity_level(
        matches
            .get_one::<u8>(commands::logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
    );
    telemetry::init(verbosity_level)?;

    dispatch::handler(&matches)
}
