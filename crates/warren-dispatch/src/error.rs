use warren_proto::ErrorCode;

/// Local dispatch failure. Mapped onto a wire [`warren_proto::ErrorCode`]
/// at the response boundary via [`DispatchError::code`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no method {0:?} found")]
    NoSuchMethod(String),
    #[error("wrong number of parameters; got {got}, want {want}")]
    MethodMismatch { got: usize, want: usize },
    #[error("json decode of parameters failed: {0}")]
    DecodeParameters(#[source] serde_json::Error),
    #[error("json encode of parameters failed: {0}")]
    EncodeParameters(#[source] serde_json::Error),
    #[error("json decode of result failed: {0}")]
    DecodeResult(#[source] serde_json::Error),
    #[error("json encode of result failed: {0}")]
    EncodeResult(#[source] serde_json::Error),
    #[error("proxy call failed: {0}")]
    ProxyFailed(String),
    #[error("{0}")]
    Wire(#[from] warren_proto::Error),
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::NoSuchMethod(_) => ErrorCode::NoSuchMethod,
            DispatchError::MethodMismatch { .. } => ErrorCode::MethodMismatch,
            DispatchError::DecodeParameters(_) => ErrorCode::JSONDecodeParameters,
            DispatchError::EncodeParameters(_) => ErrorCode::JSONEncodeParameters,
            DispatchError::DecodeResult(_) => ErrorCode::JSONDecodeResult,
            DispatchError::EncodeResult(_) => ErrorCode::JSONEncodeResult,
            DispatchError::ProxyFailed(_) => ErrorCode::ProxyFailed,
            DispatchError::Wire(e) => e.code,
        }
    }
}
