use anyhow::Result;
use std::env::var;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// The verbosity flag sets the default level; `RUST_LOG` still wins when set so
/// per-crate overrides keep working. `MENSA_LOG_FORMAT=json` switches to JSON
/// output for log collectors.
///
/// # Errors
/// Returns an error if the subscriber is already set.
pub fn init(verbosity: Option<Level>) -> Result<()> {
    let default_level = verbosity.unwrap_or(Level::ERROR);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let json_output = var("MENSA_LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json_output {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        Registry::default().with(filter).with(fmt::layer()).try_init()?;
    }

    Ok(())
}
