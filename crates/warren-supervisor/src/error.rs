use warren_proto::ErrorCode;

/// Failures at the host's side of the supervisor boundary. Distinct from
/// [`warren_proto::ErrorCode`], which is the closed wire vocabulary
/// carried inside a `Response`.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("supervisor has been stopped")]
    Stopped,
    #[error("child process died before a response arrived")]
    ChildDied,
    #[error("outbound channel closed")]
    ChannelClosed,
    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to write guest source: {0}")]
    WriteSource(#[source] std::io::Error),
    #[error(transparent)]
    Framing(#[from] warren_proto::FramingError),
    #[error(transparent)]
    Dispatch(#[from] warren_dispatch::DispatchError),
    #[error(transparent)]
    Wire(#[from] warren_proto::Error),
    /// A guest's outbound call failed to resolve a handler chain (e.g. a
    /// neighbor-rule violation or missing resource). Carries the router's
    /// own `ErrorCode` so the structured failure reason survives the hop
    /// back across the supervisor boundary instead of collapsing into a
    /// generic `NoSuchMethod`.
    #[error("resource finder failed: {message}")]
    ResourceFinder { code: ErrorCode, message: String },
}

impl SupervisorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SupervisorError::Stopped => ErrorCode::UnavailableResource,
            SupervisorError::ChildDied => ErrorCode::UnavailableResource,
            SupervisorError::ChannelClosed => ErrorCode::UnavailableResource,
            SupervisorError::Spawn(_) => ErrorCode::UnavailableResource,
            SupervisorError::WriteSource(_) => ErrorCode::UnavailableResource,
            SupervisorError::Framing(_) => ErrorCode::UnavailableResource,
            SupervisorError::Dispatch(e) => e.code(),
            SupervisorError::Wire(e) => e.code,
            SupervisorError::ResourceFinder { code, .. } => *code,
        }
    }
}
