//! Account Name Value Object
//!
//! アカウント名は、利用者・司書を識別するためのログイン名。
//! 大文字小文字を区別せずに照合し、表示には入力時の表記を使う。
//!
//! ## 設計方針
//! - ASCII文字のみ許可（a-z, 0-9, _ . -）
//! - 大文字入力は受け付けるが、canonical（正規形）は小文字
//! - NFKC正規化 → 検証 → 小文字化 の順で処理
//! - `root` は主管理者として保護される
//!
//! ## 不変条件
//! - 長さ: 3〜30文字（正規化後）
//! - 先頭・末尾: 英数字または `_`
//! - 英数字を最低1文字含む

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const ACCOUNT_NAME_MIN_LENGTH: usize = 3;
pub const ACCOUNT_NAME_MAX_LENGTH: usize = 30;

/// Primary administrator; cannot be deleted or reset by another librarian.
pub const PROTECTED_ACCOUNT: &str = "root";

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountNameError {
    #[error("Account name cannot be empty")]
    Empty,

    #[error("Account name is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("Account name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Invalid character '{char}' at position {position}. Only a-z, 0-9, _, ., - are allowed")]
    InvalidCharacter { char: char, position: usize },

    #[error("Account name must start and end with a-z, 0-9, or _")]
    InvalidBoundary,

    #[error("Account name must contain at least one letter or digit")]
    NoAlphanumeric,
}

/// Validated, normalized account name
///
/// - `original`: trimmed, NFKC normalized, case preserved (display)
/// - `canonical`: lowercase form (lookup key and uniqueness)
#[derive(Clone, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "String", into = "String")]
#[display("{original}")]
pub struct AccountName {
    original: String,
    canonical: String,
}

impl AccountName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, AccountNameError> {
        let original: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        let canonical = original.to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Rebuild from a stored display name (already validated on insert)
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    #[inline]
    pub fn is_protected(&self) -> bool {
        self.canonical == PROTECTED_ACCOUNT
    }

    fn validate(canonical: &str) -> Result<(), AccountNameError> {
        let Some(first) = canonical.chars().next() else {
            return Err(AccountNameError::Empty);
        };

        let length = canonical.chars().count();
        if length < ACCOUNT_NAME_MIN_LENGTH {
            return Err(AccountNameError::TooShort {
                length,
                min: ACCOUNT_NAME_MIN_LENGTH,
            });
        }
        if length > ACCOUNT_NAME_MAX_LENGTH {
            return Err(AccountNameError::TooLong {
                length,
                max: ACCOUNT_NAME_MAX_LENGTH,
            });
        }

        for (position, ch) in canonical.chars().enumerate() {
            if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ALLOWED_SPECIAL_CHARS.contains(&ch))
            {
                return Err(AccountNameError::InvalidCharacter { char: ch, position });
            }
        }

        let last = canonical.chars().next_back().unwrap_or(first);
        let boundary_ok = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_';
        if !boundary_ok(first) || !boundary_ok(last) {
            return Err(AccountNameError::InvalidBoundary);
        }

        if !canonical.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(AccountNameError::NoAlphanumeric);
        }

        Ok(())
    }
}

// 同一性は canonical のみで判定する
impl PartialEq for AccountName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for AccountName {}

impl std::hash::Hash for AccountName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccountName").field(&self.original).finish()
    }
}

impl TryFrom<String> for AccountName {
    type Error = AccountNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_display_casing_and_lowercases_key() {
        let name = AccountName::new("  Alice ").unwrap();
        assert_eq!(name.original(), "Alice");
        assert_eq!(name.canonical(), "alice");
        assert_eq!(name.to_string(), "Alice");
    }

    #[test]
    fn equality_ignores_case() {
        assert_eq!(AccountName::new("BOB").unwrap(), AccountName::new("bob").unwrap());
    }

    #[test]
    fn fullwidth_input_is_normalized() {
        let name = AccountName::new("ａｌｉｃｅ").unwrap();
        assert_eq!(name.canonical(), "alice");
    }

    #[test]
    fn protected_account_is_case_insensitive() {
        assert!(AccountName::new("Root").unwrap().is_protected());
        assert!(AccountName::from_db("ROOT").is_protected());
        assert!(!AccountName::new("rooter").unwrap().is_protected());
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(AccountName::new("   ").unwrap_err(), AccountNameError::Empty);
        assert!(matches!(
            AccountName::new("ab"),
            Err(AccountNameError::TooShort { length: 2, .. })
        ));
        assert!(matches!(
            AccountName::new("a".repeat(31)),
            Err(AccountNameError::TooLong { .. })
        ));
        assert!(matches!(
            AccountName::new("al ice"),
            Err(AccountNameError::InvalidCharacter { char: ' ', position: 2 })
        ));
        assert_eq!(
            AccountName::new(".alice").unwrap_err(),
            AccountNameError::InvalidBoundary
        );
        assert_eq!(AccountName::new("___").unwrap_err(), AccountNameError::NoAlphanumeric);
    }

    #[test]
    fn deserializes_through_validation() {
        let name: AccountName = serde_json::from_str("\"Carol\"").unwrap();
        assert_eq!(name.canonical(), "carol");
        assert!(serde_json::from_str::<AccountName>("\"x\"").is_err());
    }
}
