use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::filter::Filter;
use crate::resource::Resource;
use crate::store::Store;

/// Reference backend used by tests and `warren-server`'s default
/// configuration. One `RwLock` guards the whole map; `transact` takes the
/// write half for the duration of the closure, matching `persist`'s
/// single in-process lock (Design Notes §9).
#[derive(Default)]
pub struct MemoryStore {
    resources: RwLock<HashMap<String, Resource>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, id: &str) -> Result<Resource, StoreError> {
        self.resources
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn put(&self, resource: Resource) -> Result<(), StoreError> {
        self.resources
            .write()
            .await
            .insert(resource.id.clone(), resource);
        Ok(())
    }

    async fn find(&self, filter: Filter) -> Result<Vec<Resource>, StoreError> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|resource| filter.matches(resource))
            .cloned()
            .collect())
    }

    async fn transact(
        &self,
        ids: &[&str],
        f: Box<dyn FnOnce(Vec<Option<Resource>>) -> Result<Vec<Resource>, StoreError> + Send>,
    ) -> Result<(), StoreError> {
        let mut guard = self.resources.write().await;
        let snapshots = ids.iter().map(|id| guard.get(*id).cloned()).collect();
        let updated = f(snapshots)?;
        for resource in updated {
            guard.insert(resource.id.clone(), resource);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{move_to, remove};

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryStore::new();
        store.put(Resource::new("r1", "alice", "")).await.unwrap();
        let back = store.get("r1").await.unwrap();
        assert_eq!(back.owner, "alice");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn find_filters_by_owner() {
        let store = MemoryStore::new();
        store.put(Resource::new("r1", "alice", "")).await.unwrap();
        store.put(Resource::new("r2", "bob", "")).await.unwrap();
        let found = store.find(Filter::new().eq("owner", "alice")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "r1");
    }

    #[tokio::test]
    async fn remove_detaches_from_container_content_list() {
        let store = MemoryStore::new();
        let mut void = Resource::new("void", "system", "");
        void.content.push("child".to_string());
        store.put(void).await.unwrap();
        store
            .put(Resource::new("child", "alice", "").with_container("void"))
            .await
            .unwrap();

        remove(&store, "child").await.unwrap();

        let child = store.get("child").await.unwrap();
        assert!(child.container.is_none());
        let void = store.get("void").await.unwrap();
        assert!(!void.content.contains(&"child".to_string()));
    }

    #[tokio::test]
    async fn move_to_relinks_content_lists_atomically() {
        let store = MemoryStore::new();
        let mut room_a = Resource::new("room-a", "system", "");
        room_a.content.push("item".to_string());
        store.put(room_a).await.unwrap();
        store.put(Resource::new("room-b", "system", "")).await.unwrap();
        store
            .put(Resource::new("item", "alice", "").with_container("room-a"))
            .await
            .unwrap();

        move_to(&store, "item", "room-b").await.unwrap();

        let item = store.get("item").await.unwrap();
        assert_eq!(item.container.as_deref(), Some("room-b"));
        let room_a = store.get("room-a").await.unwrap();
        assert!(!room_a.content.contains(&"item".to_string()));
        let room_b = store.get("room-b").await.unwrap();
        assert!(room_b.content.contains(&"item".to_string()));
    }
}
