/// Errors originating inside the guest process: failed outbound calls,
/// teardown races, and malformed inbound lifecycle messages.
#[derive(Debug, thiserror::Error)]
pub enum GuestError {
    #[error("outbound call channel closed before a response arrived")]
    ChannelClosed,
    #[error("outbound call abandoned: originating resource {0:?} was destructed")]
    Abandoned(String),
    #[error("resource {0:?} already constructed")]
    AlreadyConstructed(String),
    #[error("resource {0:?} not constructed")]
    NotConstructed(String),
    #[error("no factory registered for this guest program")]
    NoFactory,
    #[error(transparent)]
    Dispatch(#[from] warren_dispatch::DispatchError),
    #[error(transparent)]
    Wire(#[from] warren_proto::Error),
}
