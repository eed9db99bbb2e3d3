//! Auth Middleware
//!
//! Resolves the caller identity from the signed cookie for protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use kernel::clock::Clock;
use kernel::identity::Identity;

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::presentation::token::{self, IdentityClaims, TokenScope};

/// Middleware state
#[derive(Clone)]
pub struct IdentityGuard {
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl IdentityGuard {
    pub fn new(config: Arc<AuthConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Claims of any scope
    pub fn claims(&self, headers: &HeaderMap) -> Option<IdentityClaims> {
        let raw = self.config.cookie.extract(headers)?;
        token::decode(&self.config, &raw, self.clock.now())
    }

    /// Identity with a full-scope token
    pub fn identity(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        self.claims(headers)
            .filter(|claims| claims.scope == TokenScope::Full)
            .map(|claims| claims.identity())
            .ok_or(AuthError::Unauthorized)
    }
}

/// Middleware that requires a full-scope identity and exposes it to handlers
/// as an `Extension<Identity>`.
///
/// The token is checked by signature and expiry only; the account store is
/// not consulted. A token minted before `delete_account` or `reset_password`
/// keeps working until it expires, at most `AuthConfig::token_ttl` later.
pub async fn require_identity(
    State(guard): State<IdentityGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = guard.identity(req.headers())?;
    tracing::debug!(account = %identity.username, role = %identity.role, "Identity resolved");
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
