//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    // Validate argument combinations relative to each other
    crate::cli::commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: SecretString::from(auth_opts.jwt_secret),
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        frontend_origin: auth_opts.frontend_origin,
        bootstrap_admin_email: auth_opts.bootstrap_admin_email,
        bootstrap_admin_password: auth_opts
            .bootstrap_admin_password
            .map(SecretString::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action() {
        temp_env::with_vars(
            [
                ("MENSA_BOOTSTRAP_ADMIN_EMAIL", None::<&str>),
                ("MENSA_BOOTSTRAP_ADMIN_PASSWORD", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "mensa",
                    "--port",
                    "9090",
                    "--dsn",
                    "postgres://localhost:5432/mensa",
                    "--jwt-secret",
                    "secret",
                ]);
                let action = handler(&matches).expect("action");
                let Action::Server(args) = action;
                assert_eq!(args.port, 9090);
                assert_eq!(args.dsn, "postgres://localhost:5432/mensa");
                assert_eq!(args.jwt_secret.expose_secret(), "secret");
                assert_eq!(args.token_ttl_seconds, 86_400);
                assert!(args.bootstrap_admin_email.is_none());
            },
        );
    }

    #[test]
    fn handler_rejects_lonely_bootstrap_email() {
        temp_env::with_vars(
            [("MENSA_BOOTSTRAP_ADMIN_PASSWORD", None::<&str>)],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "mensa",
                    "--dsn",
                    "postgres://localhost:5432/mensa",
                    "--jwt-secret",
                    "secret",
                    "--bootstrap-admin-email",
                    "admin@mensa.app",
                ]);
                let result = handler(&matches);
                assert!(result.is_err());
            },
        );
    }
}
