//! Auth configuration and shared state.

use secrecy::SecretString;

// 24 hours. No refresh mechanism exists; expiry requires a fresh login.
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Process-wide auth configuration, constructed at startup and injected into
/// the router. Core logic never reads these values from ambient globals.
#[derive(Clone)]
pub struct AuthConfig {
    signing_secret: SecretString,
    token_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(signing_secret: SecretString) -> Self {
        Self {
            signing_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn signing_secret(&self) -> &SecretString {
        &self.signing_secret
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"***")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

/// Shared auth state carried as an `Extension` layer.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new(SecretString::from("secret"));
        assert_eq!(config.token_ttl_seconds(), super::DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(config.signing_secret().expose_secret(), "secret");

        let config = config.with_token_ttl_seconds(600);
        assert_eq!(config.token_ttl_seconds(), 600);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AuthConfig::new(SecretString::from("super-secret"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn default_window_is_24_hours() {
        assert_eq!(super::DEFAULT_TOKEN_TTL_SECONDS, 86_400);
    }
}
