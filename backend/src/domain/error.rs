//! Transport-agnostic failure type returned by every driving port.
//!
//! Services pick an [`ErrorCode`] and a client-safe message. The HTTP adapter
//! chooses the status from the code and serialises the rest as the JSON body
//! `{code, message, traceId?, details?}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::trace_id::TraceId;

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Failure category. Serialised in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input or a broken content rule.
    InvalidRequest,
    /// Missing, unknown, or expired session; bad credentials.
    Unauthorized,
    /// Signed in, but not the post's author.
    Forbidden,
    NotFound,
    /// Username or email already registered.
    Conflict,
    /// PostgreSQL or Redis unreachable.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "request is invalid",
            Self::Unauthorized => "authentication required",
            Self::Forbidden => "not permitted",
            Self::NotFound => "not found",
            Self::Conflict => "already exists",
            Self::ServiceUnavailable => "service temporarily unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Domain error.
///
/// The message is never blank, and errors created inside a request copy
/// that request's [`TraceId`].
///
/// ```
/// use chirp_backend::domain::{Error, ErrorCode};
/// use serde_json::json;
///
/// let err = Error::forbidden("only the author may delete this post")
///     .with_details(json!({ "post_id": 7 }));
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// assert_eq!(err.details(), Some(&json!({ "post_id": 7 })));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "WireError")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "content must be at most 140 characters")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// A received error payload had a blank message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error message must not be blank")]
pub struct BlankErrorMessage;

impl Error {
    /// Build an error in the current trace scope. A blank `message` is
    /// replaced with a generic one for `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Attach machine-readable context such as `{"field": "content"}`.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Replace the captured trace id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// The client-facing form: internal errors lose their message and
    /// details but keep the trace id.
    #[must_use]
    pub fn redacted(&self) -> Self {
        if self.code != ErrorCode::InternalError {
            return self.clone();
        }
        Self {
            code: ErrorCode::InternalError,
            message: ErrorCode::InternalError.fallback_message().to_owned(),
            trace_id: self.trace_id.clone(),
            details: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireError {
    code: ErrorCode,
    message: String,
    #[serde(default)]
    trace_id: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

impl TryFrom<WireError> for Error {
    type Error = BlankErrorMessage;

    // A received payload keeps its own trace id and never picks up the
    // ambient one.
    fn try_from(wire: WireError) -> Result<Self, Self::Error> {
        if wire.message.trim().is_empty() {
            return Err(BlankErrorMessage);
        }
        Ok(Self {
            code: wire.code,
            message: wire.message,
            trace_id: wire.trace_id.filter(|id| !id.trim().is_empty()),
            details: wire.details,
        })
    }
}
