use serde::{Deserialize, Serialize};

/// Closed vocabulary of wire-level error codes (spec §4.1).
///
/// This is the *wire* vocabulary, not a Rust error type — local
/// `thiserror` enums in each crate map onto one of these at the
/// request/response boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    NoSuchMethod,
    MethodMismatch,
    NoSuchResource,
    UnavailableResource,
    JSONDecodeParameters,
    JSONEncodeParameters,
    JSONDecodeResult,
    JSONEncodeResult,
    ProxyFailed,
    SendToClient,
    Database,
    Regexp,
    EventType,
    Unknown,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// `{message, code}` as carried on the wire (spec §4.1).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Error {
    pub message: String,
    pub code: ErrorCode,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl std::fmt::Display for Error {
    /// User-visible failure rendering per spec §7: `"<message>: <code>"`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message, self.code)
    }
}

impl std::error::Error for Error {}
