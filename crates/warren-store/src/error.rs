/// Failures from the persistence contract. `NotFound` is the one
/// distinguished case the core's control flow branches on (spec §6);
/// everything else is an opaque backend failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no resource with id {0:?}")]
    NotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
}
