#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Router(#[from] warren_router::RouterError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
