use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The core's single data type (spec §3): a stable id, its author, its
/// guest source text, the resource containing it, and the ordered list
/// of resources it contains.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub owner: String,
    pub source: String,
    pub container: Option<String>,
    pub content: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Resource {
    pub fn new(id: impl Into<String>, owner: impl Into<String>, source: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: id.into(),
            owner: owner.into(),
            source: source.into(),
            container: None,
            content: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

/// Detaches `id` from whatever container it currently lists, in one
/// transaction against both resources (spec §6's container-link
/// maintenance; grounded on `server/resource/resource.go`'s remove path).
/// A no-op, successfully, if the resource has no container.
pub async fn remove(store: &dyn crate::store::Store, id: &str) -> Result<(), crate::error::StoreError> {
    let resource = store.get(id).await?;
    let Some(container_id) = resource.container.clone() else {
        return Ok(());
    };
    let ids = [id, container_id.as_str()];
    store
        .transact(
            &ids,
            Box::new(move |snapshots| {
                let mut iter = snapshots.into_iter();
                let mut resource = iter
                    .next()
                    .flatten()
                    .ok_or_else(|| crate::error::StoreError::NotFound(id.to_string()))?;
                let mut container = iter
                    .next()
                    .flatten()
                    .ok_or_else(|| crate::error::StoreError::NotFound(container_id.clone()))?;
                container.content.retain(|child| child != &resource.id);
                container.updated_at = OffsetDateTime::now_utc();
                resource.container = None;
                resource.updated_at = OffsetDateTime::now_utc();
                Ok(vec![resource, container])
            }),
        )
        .await
}

/// Moves `id` out of its current container (if any) and into `new_container`,
/// updating both content lists in a single transaction so the resource is
/// never observably linked from two containers at once.
pub async fn move_to(
    store: &dyn crate::store::Store,
    id: &str,
    new_container: &str,
) -> Result<(), crate::error::StoreError> {
    let resource = store.get(id).await?;
    let old_container = resource.container.clone();
    let new_container = new_container.to_string();
    let mut ids: Vec<&str> = vec![id];
    if let Some(old) = old_container.as_deref() {
        ids.push(old);
    }
    ids.push(new_container.as_str());

    let id_owned = id.to_string();
    store
        .transact(
            &ids,
            Box::new(move |snapshots| {
                let mut iter = snapshots.into_iter();
                let mut resource = iter
                    .next()
                    .flatten()
                    .ok_or_else(|| crate::error::StoreError::NotFound(id_owned.clone()))?;
                let mut old = if old_container.is_some() {
                    iter.next().flatten()
                } else {
                    None
                };
                let mut new = iter
                    .next()
                    .flatten()
                    .ok_or_else(|| crate::error::StoreError::NotFound(new_container.clone()))?;

                if let Some(old) = old.as_mut() {
                    old.content.retain(|child| child != &resource.id);
                    old.updated_at = OffsetDateTime::now_utc();
                }
                new.content.push(resource.id.clone());
                new.updated_at = OffsetDateTime::now_utc();
                resource.container = Some(new.id.clone());
                resource.updated_at = OffsetDateTime::now_utc();

                let mut out = vec![resource];
                if let Some(old) = old {
                    out.push(old);
                }
                out.push(new);
                Ok(out)
            }),
        )
        .await
}
