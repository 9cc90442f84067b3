//! Structured error classification shared across service boundaries.
//!
//! Every fallible operation exposed to a client surface reports one of these
//! kinds alongside its message. HTTP handlers map kinds to numeric status
//! codes; clients branch on the kind, never on message substrings.

use serde::{Deserialize, Serialize};

/// Machine-readable classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or rejected input (surfaced inline under form fields).
    Validation,
    /// The email is already registered.
    Conflict,
    /// Too many requests; retry later.
    RateLimit,
    /// The referenced record does not exist (or was invalidated).
    NotFound,
    /// The record's validity window has elapsed.
    Expired,
    /// The submitted code does not match.
    Mismatch,
    /// A required prior step was not completed.
    PreconditionFailed,
    /// The resource already exists.
    AlreadyExists,
    /// No authenticated user, or the credential was rejected.
    Unauthenticated,
    /// Anything unexpected; surfaced as a generic failure banner.
    Internal,
}

impl ErrorKind {
    /// HTTP status code this kind maps to at the API boundary.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthenticated => 401,
            Self::NotFound => 404,
            Self::Conflict | Self::AlreadyExists => 409,
            Self::Expired => 410,
            Self::Mismatch => 400,
            Self::PreconditionFailed => 412,
            Self::RateLimit => 429,
            Self::Internal => 500,
        }
    }

    /// Whether the caller may usefully retry the same request unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::Internal)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::RateLimit => "rate_limit",
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::Mismatch => "mismatch",
            Self::PreconditionFailed => "precondition_failed",
            Self::AlreadyExists => "already_exists",
            Self::Unauthenticated => "unauthenticated",
            Self::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_statuses() {
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
        assert_eq!(ErrorKind::Expired.http_status(), 410);
        assert_eq!(ErrorKind::RateLimit.http_status(), 429);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::PreconditionFailed).unwrap();
        assert_eq!(json, "\"precondition_failed\"");
    }
}
