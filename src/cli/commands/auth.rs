use anyhow::{Context, Result};
use clap::{Arg, Command};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_FRONTEND_ORIGIN: &str = "frontend-origin";
pub const ARG_BOOTSTRAP_ADMIN_EMAIL: &str = "bootstrap-admin-email";
pub const ARG_BOOTSTRAP_ADMIN_PASSWORD: &str = "bootstrap-admin-password";

// 24 hours, matching the fixed token validity window.
const DEFAULT_TOKEN_TTL_SECONDS: &str = "86400";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret key used to sign and verify bearer tokens")
                .env("MENSA_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Bearer token validity window in seconds")
                .env("MENSA_TOKEN_TTL_SECONDS")
                .default_value(DEFAULT_TOKEN_TTL_SECONDS)
                .value_parser(clap::value_parser!(i64).range(60..)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_ORIGIN)
                .long(ARG_FRONTEND_ORIGIN)
                .help("Frontend origin allowed by CORS (any origin when unset)")
                .env("MENSA_FRONTEND_ORIGIN"),
        )
        .arg(
            Arg::new(ARG_BOOTSTRAP_ADMIN_EMAIL)
                .long(ARG_BOOTSTRAP_ADMIN_EMAIL)
                .help("Email of the admin account created at startup when no active admin exists")
                .env("MENSA_BOOTSTRAP_ADMIN_EMAIL"),
        )
        .arg(
            Arg::new(ARG_BOOTSTRAP_ADMIN_PASSWORD)
                .long(ARG_BOOTSTRAP_ADMIN_PASSWORD)
                .help("Password for the bootstrap admin account")
                .env("MENSA_BOOTSTRAP_ADMIN_PASSWORD"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub frontend_origin: Option<String>,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Options {
    /// Extract auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if the required secret is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(86_400);

        Ok(Self {
            jwt_secret,
            token_ttl_seconds,
            frontend_origin: matches.get_one::<String>(ARG_FRONTEND_ORIGIN).cloned(),
            bootstrap_admin_email: matches
                .get_one::<String>(ARG_BOOTSTRAP_ADMIN_EMAIL)
                .cloned(),
            bootstrap_admin_password: matches
                .get_one::<String>(ARG_BOOTSTRAP_ADMIN_PASSWORD)
                .cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_ttl() {
        let command = crate::cli::commands::new();
        let matches = command.get_matches_from(vec![
            "mensa",
            "--dsn",
            "postgres://localhost/mensa",
            "--jwt-secret",
            "secret",
        ]);
        let options = Options::parse(&matches).expect("options");
        assert_eq!(options.jwt_secret, "secret");
        assert_eq!(options.token_ttl_seconds, 86_400);
        assert_eq!(options.frontend_origin, None);
        assert_eq!(options.bootstrap_admin_email, None);
    }

    #[test]
    fn parse_rejects_short_ttl() {
        let command = crate::cli::commands::new();
        let result = command.try_get_matches_from(vec![
            "mensa",
            "--dsn",
            "postgres://localhost/mensa",
            "--jwt-secret",
            "secret",
            "--token-ttl-seconds",
            "5",
        ]);
        assert!(result.is_err(), "TTL below 60 seconds should be rejected");
    }
}
