use crate::cli::actions::{Action, server};
use anyhow::Result;

/// Route an `Action` to its implementation. New variants get a match arm here.
/// # Errors
/// Propagates whatever the action itself fails with.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
    }
}
