//! Message Category
//!
//! Every outcome the core reports (success payloads and typed failures)
//! belongs to exactly one category. The request layer decides how a
//! category is rendered; the mapping itself is part of the contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ユーザー向けメッセージの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCategory {
    /// 操作が完了した
    Success,
    /// 操作は受け付けたが利用者の対応が必要
    Warning,
    /// 操作が拒否された、または失敗した
    Danger,
}

impl MessageCategory {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::Success => "success",
            MessageCategory::Warning => "warning",
            MessageCategory::Danger => "danger",
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(MessageCategory::Success.to_string(), "success");
        assert_eq!(MessageCategory::Warning.to_string(), "warning");
        assert_eq!(MessageCategory::Danger.to_string(), "danger");
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&MessageCategory::Danger).unwrap();
        assert_eq!(json, "\"danger\"");
    }
}
