use crate::api::{self, handlers::auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub frontend_origin: Option<String>,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<SecretString>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, migrations fail, or the
/// server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config =
        AuthConfig::new(args.jwt_secret).with_token_ttl_seconds(args.token_ttl_seconds);

    let bootstrap_admin = match (args.bootstrap_admin_email, args.bootstrap_admin_password) {
        (Some(email), Some(password)) => Some(api::BootstrapAdmin { email, password }),
        _ => None,
    };

    api::new(
        args.port,
        args.dsn,
        args.frontend_origin,
        auth_config,
        bootstrap_admin,
    )
    .await
}
