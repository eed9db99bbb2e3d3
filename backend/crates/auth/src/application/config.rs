//! Application Configuration
//!
//! Configuration for the Auth application layer.

use chrono::Duration;
use platform::cookie::CookieConfig;
use platform::crypto::KEY_LEN;
use platform::password::Argon2Config;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Consecutive failures that trigger a lockout
    pub max_attempts: u16,
    /// Reader lockout window
    pub lockout_duration: Duration,
    /// Librarian password rotation period
    pub password_max_age: Duration,
    /// HMAC key for the identity token
    pub token_secret: [u8; KEY_LEN],
    /// Identity token lifetime; matches the cookie Max-Age
    pub token_ttl: Duration,
    pub cookie: CookieConfig,
    pub argon2: Argon2Config,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            lockout_duration: Duration::minutes(3),
            password_max_age: Duration::days(180),
            token_secret: [0u8; KEY_LEN],
            token_ttl: Duration::minutes(30),
            cookie: CookieConfig::default(),
            argon2: Argon2Config::default(),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; KEY_LEN];
        secret.copy_from_slice(&platform::crypto::random_bytes(KEY_LEN));
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie, cheap hashing)
    pub fn development() -> Self {
        Self {
            cookie: CookieConfig::development(),
            argon2: Argon2Config::development(),
            ..Self::with_random_secret()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = AuthConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.lockout_duration, Duration::minutes(3));
        assert_eq!(config.password_max_age, Duration::days(180));
        assert_eq!(config.token_ttl.num_seconds(), config.cookie.max_age_secs.unwrap_or_default());
    }

    #[test]
    fn development_uses_a_fresh_secret() {
        let a = AuthConfig::development();
        let b = AuthConfig::development();
        assert_ne!(a.token_secret, b.token_secret);
        assert!(!a.cookie.secure);
    }
}
