use async_trait::async_trait;

use crate::error::StoreError;
use crate::filter::Filter;
use crate::resource::Resource;

/// The persistence contract the runtime core is built against (spec §6).
/// `transact` is the one read-modify-write primitive: callers fetch,
/// mutate, and return the resources to persist, all under one backend-held
/// lock, so container-link maintenance never races a concurrent put.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, id: &str) -> Result<Resource, StoreError>;

    async fn put(&self, resource: Resource) -> Result<(), StoreError>;

    async fn find(&self, filter: Filter) -> Result<Vec<Resource>, StoreError>;

    /// Runs `f` against a fresh snapshot of every resource named in `ids`,
    /// under a single exclusive lock, and persists whatever it returns.
    /// `f` returning `Err` aborts the transaction with nothing written.
    async fn transact(
        &self,
        ids: &[&str],
        f: Box<dyn FnOnce(Vec<Option<Resource>>) -> Result<Vec<Resource>, StoreError> + Send>,
    ) -> Result<(), StoreError>;
}
