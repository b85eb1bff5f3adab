use warren_proto::ErrorCode;

/// Failures at the router's boundary. `code()` maps each variant onto the
/// closed wire vocabulary so host adapters can turn a `RouterError` into a
/// `Response` the same way any other dispatchable does.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("no such resource {0:?}")]
    NoSuchResource(String),
    #[error("target is not a neighbor of source")]
    UnavailableResource,
    #[error("source rejected by validator: {0}")]
    ValidationFailed(String),
    #[error(transparent)]
    Store(#[from] warren_store::StoreError),
    #[error(transparent)]
    Supervisor(#[from] warren_supervisor::SupervisorError),
    #[error(transparent)]
    Regexp(#[from] regex::Error),
}

impl RouterError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RouterError::NoSuchResource(_) => ErrorCode::NoSuchResource,
            RouterError::UnavailableResource => ErrorCode::UnavailableResource,
            RouterError::ValidationFailed(_) => ErrorCode::Unknown,
            RouterError::Store(_) => ErrorCode::Database,
            RouterError::Supervisor(_) => ErrorCode::Unknown,
            RouterError::Regexp(_) => ErrorCode::Regexp,
        }
    }
}
