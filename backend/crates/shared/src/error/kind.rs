//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum shared by every crate. Each kind maps to
//! an HTTP status code and to a [`MessageCategory`].

use serde::Serialize;

use crate::message::MessageCategory;

/// エラー種別の列挙体
///
/// 貸出・認証コアが返す失敗の分類です。
/// `ServiceUnavailable` はストアの接続断やタイムアウトを表し、
/// 詳細は利用者に見せません。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Conflict;
/// assert_eq!(kind.status_code(), 409);
/// assert_eq!(kind.as_str(), "Conflict");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - Bad Request: 入力がポリシーに違反
    BadRequest,
    /// 401 - Unauthorized: 認証情報またはロールが不一致
    Unauthorized,
    /// 403 - Forbidden: 保護されたアカウントへの操作
    Forbidden,
    /// 404 - Not Found: アカウントまたは蔵書が存在しない
    NotFound,
    /// 409 - Conflict: 貸出上限、貸出中、返却対象なし
    Conflict,
    /// 423 - Locked: ログイン試行回数超過によるロック
    Locked,
    /// 500 - Internal Server Error: サーバー内部エラー
    InternalServerError,
    /// 503 - Service Unavailable: ストアへの一時的な接続失敗
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::Locked.status_code(), 423);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Locked => 423,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// HTTP の理由フレーズ
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Locked => "Locked",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 利用者向けメッセージの分類
    ///
    /// 入力で解消できる失敗は `Warning`、それ以外は `Danger`。
    #[inline]
    pub const fn category(&self) -> MessageCategory {
        match self {
            ErrorKind::BadRequest => MessageCategory::Warning,
            _ => MessageCategory::Danger,
        }
    }

    /// 再試行で解消しうる一時的な失敗かどうか
    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::ServiceUnavailable)
    }

    /// 5xx系のエラーはログに記録すべきです。
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::Locked.status_code(), 423);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
        assert_eq!(ErrorKind::ServiceUnavailable.status_code(), 503);
    }

    #[test]
    fn test_category() {
        assert_eq!(ErrorKind::BadRequest.category(), MessageCategory::Warning);
        assert_eq!(ErrorKind::Conflict.category(), MessageCategory::Danger);
        assert_eq!(
            ErrorKind::ServiceUnavailable.category(),
            MessageCategory::Danger
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(ErrorKind::ServiceUnavailable.is_transient());
        assert!(!ErrorKind::Conflict.is_transient());
        assert!(!ErrorKind::InternalServerError.is_transient());
    }

    #[test]
    fn test_is_server_error() {
        assert!(!ErrorKind::NotFound.is_server_error());
        assert!(ErrorKind::InternalServerError.is_server_error());
        assert!(ErrorKind::ServiceUnavailable.is_server_error());
        assert!(ErrorKind::Locked.is_client_error());
    }
}
