//! Identity token
//!
//! The cookie value is an HMAC-signed JSON claim set. There is no
//! server-side session row; expiry is carried in the claims.

use chrono::{DateTime, Utc};
use kernel::identity::{Identity, Role};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// What the bearer may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    /// Every operation permitted for the role
    Full,
    /// Only the password change endpoint (librarian with an expired password)
    PasswordChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(rename = "sub")]
    pub username: String,
    pub role: Role,
    pub scope: TokenScope,
    /// Unix seconds
    pub exp: i64,
}

impl IdentityClaims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone(), self.role)
    }
}

pub fn mint(
    config: &AuthConfig,
    identity: &Identity,
    scope: TokenScope,
    now: DateTime<Utc>,
) -> AuthResult<String> {
    let claims = IdentityClaims {
        username: identity.username.clone(),
        role: identity.role,
        scope,
        exp: (now + config.token_ttl).timestamp(),
    };
    let payload = serde_json::to_vec(&claims)
        .map_err(|e| AuthError::Internal(format!("Token encoding failed: {e}")))?;
    Ok(platform::crypto::sign(&config.token_secret, &payload))
}

/// `None` for a forged, malformed or expired token
pub fn decode(config: &AuthConfig, token: &str, now: DateTime<Utc>) -> Option<IdentityClaims> {
    let payload = platform::crypto::verify(&config.token_secret, token).ok()?;
    let claims: IdentityClaims = serde_json::from_slice(&payload).ok()?;
    (claims.exp > now.timestamp()).then_some(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn mint_then_decode() {
        let config = AuthConfig::development();
        let identity = Identity::new("alice", Role::Reader);
        let token = mint(&config, &identity, TokenScope::Full, now()).unwrap();

        let claims = decode(&config, &token, now()).unwrap();
        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.scope, TokenScope::Full);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig::development();
        let identity = Identity::new("alice", Role::Reader);
        let token = mint(&config, &identity, TokenScope::Full, now()).unwrap();

        assert!(decode(&config, &token, now() + Duration::minutes(29)).is_some());
        assert!(decode(&config, &token, now() + Duration::minutes(30)).is_none());
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let identity = Identity::new("root", Role::Librarian);
        let token = mint(&AuthConfig::development(), &identity, TokenScope::Full, now()).unwrap();
        assert!(decode(&AuthConfig::development(), &token, now()).is_none());
    }
}
