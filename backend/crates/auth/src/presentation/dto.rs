//! API DTOs (Data Transfer Objects)

use kernel::identity::Role;
use kernel::message::MessageCategory;
use serde::{Deserialize, Serialize};

use crate::application::AccountSummary;

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Role selected on the login form
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub username: String,
    pub role: Role,
    pub must_change_password: bool,
    pub message: String,
    pub category: MessageCategory,
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub must_change_password: bool,
}

// ============================================================================
// Passwords
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListResponse {
    pub accounts: Vec<AccountSummary>,
}

// ============================================================================
// Generic
// ============================================================================

/// Outcome text with its display category
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
    pub category: MessageCategory,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: MessageCategory::Success,
        }
    }
}
