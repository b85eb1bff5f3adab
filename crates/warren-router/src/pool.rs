use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sha1::{Digest, Sha1};
use tokio::sync::RwLock;

use warren_supervisor::{LaunchSpec, ResourceFinder, Supervisor};

use crate::error::RouterError;
use crate::validate::Validator;

type OwnerCode = (String, String);

/// Supervisor pooling (spec §4.5 item 1): `byOwnerCode` reuses one child
/// per (author, code-hash) pair; `byResource` remembers which pool entry
/// a constructed resource belongs to.
pub struct Pool {
    launch: LaunchSpec,
    cooldown: Duration,
    validator: Arc<dyn Validator>,
    finder: Arc<dyn ResourceFinder>,
    by_owner_code: RwLock<HashMap<OwnerCode, Arc<Supervisor>>>,
    by_resource: RwLock<HashMap<String, OwnerCode>>,
}

impl Pool {
    pub fn new(
        launch: LaunchSpec,
        cooldown: Duration,
        validator: Arc<dyn Validator>,
        finder: Arc<dyn ResourceFinder>,
    ) -> Self {
        Self {
            launch,
            cooldown,
            validator,
            finder,
            by_owner_code: RwLock::new(HashMap::new()),
            by_resource: RwLock::new(HashMap::new()),
        }
    }

    pub async fn supervisor_for(&self, resource: &str) -> Option<Arc<Supervisor>> {
        let key = self.by_resource.read().await.get(resource).cloned()?;
        self.by_owner_code.read().await.get(&key).cloned()
    }

    pub async fn is_bound(&self, resource: &str) -> bool {
        self.by_resource.read().await.contains_key(resource)
    }

    /// Ensures a supervisor exists for `(owner, source)` and that
    /// `resource` is bound to it, launching a fresh child only on first
    /// use of that owner-code key (spec §4.5 item 1).
    pub async fn bind(
        &self,
        resource: &str,
        owner: &str,
        source: &str,
    ) -> Result<Arc<Supervisor>, RouterError> {
        self.validator
            .validate(source)
            .map_err(|_| RouterError::ValidationFailed(owner.to_string()))?;

        let key: OwnerCode = (owner.to_string(), hash_source(source));

        // Launching is not a "child-process I/O wait" (spec §5's leaf-lock
        // rule targets awaiting a running child, not spawning one), so
        // holding the write lock across it closes the race where two
        // callers would otherwise both spawn a supervisor for the same key.
        let mut by_owner_code = self.by_owner_code.write().await;
        let supervisor = match by_owner_code.get(&key) {
            Some(supervisor) => supervisor.clone(),
            None => {
                let supervisor = Supervisor::new(
                    source.to_string(),
                    self.launch.clone(),
                    self.finder.clone(),
                    self.cooldown,
                );
                supervisor.start().await?;
                by_owner_code.insert(key.clone(), supervisor.clone());
                supervisor
            }
        };
        drop(by_owner_code);

        self.by_resource
            .write()
            .await
            .insert(resource.to_string(), key);
        Ok(supervisor)
    }

    /// Unbinds `resource` from its pool entry. Returns the supervisor and
    /// whether it should now be stopped and evicted, i.e. its refcount has
    /// reached zero (spec §4.5 item 4).
    pub async fn unbind(&self, resource: &str) -> Option<(Arc<Supervisor>, bool)> {
        let key = self.by_resource.write().await.remove(resource)?;
        let supervisor = self.by_owner_code.read().await.get(&key)?.clone();
        if supervisor.refcount() <= 0 {
            self.by_owner_code.write().await.remove(&key);
            Some((supervisor, true))
        } else {
            Some((supervisor, false))
        }
    }
}

fn hash_source(source: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(source.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
