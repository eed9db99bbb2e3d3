//! Caller identity
//!
//! Who is acting on a request. Produced by authentication and passed
//! explicitly to every use case that enforces a role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Role {
    #[serde(alias = "Reader")]
    Reader = 0,
    #[serde(alias = "Librarian")]
    Librarian = 1,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Librarian => "librarian",
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Role::Reader),
            1 => Some(Role::Librarian),
            _ => None,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Role::Reader),
            "librarian" => Ok(Role::Librarian),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Authenticated caller
///
/// `username` is the canonical (lowercase) account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    #[inline]
    pub fn is_reader(&self) -> bool {
        self.role == Role::Reader
    }

    #[inline]
    pub fn is_librarian(&self) -> bool {
        self.role == Role::Librarian
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_codes_roundtrip() {
        for role in [Role::Reader, Role::Librarian] {
            assert_eq!(role.code().parse::<Role>().unwrap(), role);
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!("Librarian".parse::<Role>().unwrap(), Role::Librarian);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::from_id(7), None);
    }

    #[test]
    fn identity_serializes_role_lowercase() {
        let identity = Identity::new("alice", Role::Reader);
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, r#"{"username":"alice","role":"reader"}"#);

        let parsed: Identity =
            serde_json::from_str(r#"{"username":"root","role":"Librarian"}"#).unwrap();
        assert_eq!(parsed.role, Role::Librarian);
    }
}
