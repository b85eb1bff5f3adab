use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use warren_proto::{Blob, Request};

use crate::error::GuestError;

struct Waiter {
    tx: oneshot::Sender<Result<Vec<Value>, GuestError>>,
    origin: String,
}

/// Shared, process-wide outbound-call state (spec §4.3: "Global mutable
/// state... model each as process-wide state with explicit init/teardown
/// and an atomic counter"). One instance per guest process, handed to
/// every constructed resource's [`Mcp`] handle.
pub(crate) struct McpInner {
    next_id: AtomicU64,
    pending: Mutex<HashMap<String, Waiter>>,
    outbound: mpsc::UnboundedSender<Blob>,
}

impl McpInner {
    pub(crate) fn new(outbound: mpsc::UnboundedSender<Blob>) -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            outbound,
        })
    }

    /// Resolves the waiter matching a `Response` blob's id, if still live.
    pub(crate) async fn resolve(&self, id: &str, result: Result<Vec<Value>, GuestError>) {
        let waiter = { self.pending.lock().await.remove(id) };
        if let Some(waiter) = waiter {
            let _ = waiter.tx.send(result);
        }
    }

    /// Drops every in-flight call originated by `resource`, resolving each
    /// waiter with [`GuestError::Abandoned`] rather than leaving it to hang
    /// (spec §4.3: "drops in-flight requests originated by that resource;
    /// they are abandoned, not cancelled upstream").
    pub(crate) async fn abandon(&self, resource: &str) {
        let mut guard = self.pending.lock().await;
        let ids: Vec<String> = guard
            .iter()
            .filter(|(_, waiter)| waiter.origin == resource)
            .map(|(id, _)| id.clone())
            .collect();
        for id in ids {
            if let Some(waiter) = guard.remove(&id) {
                let _ = waiter.tx.send(Err(GuestError::Abandoned(resource.to_string())));
            }
        }
    }
}

/// The outbound-call capability handed to a guest handler at construction
/// (spec §4.3's `MCP` capability). Each resource gets its own `Mcp`,
/// stamped with that resource's id as the outbound request's `source`.
#[derive(Clone)]
pub struct Mcp {
    resource: String,
    inner: Arc<McpInner>,
}

impl Mcp {
    pub(crate) fn new(resource: impl Into<String>, inner: Arc<McpInner>) -> Self {
        Self {
            resource: resource.into(),
            inner,
        }
    }

    /// Issues a blocking outbound call: assign an id, install a waiter
    /// under the pending-map lock, emit, then suspend until the matching
    /// `Response` arrives (spec §4.3/§5's coroutine-across-processes
    /// pattern — waiter installed before emission to avoid a lost-response
    /// race, matching the supervisor's write path).
    pub async fn call(
        &self,
        target: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Value>, GuestError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let parameters = serde_json::to_string(&params).map_err(|err| {
            GuestError::Wire(warren_proto::Error::new(
                warren_proto::ErrorCode::JSONEncodeParameters,
                err.to_string(),
            ))
        })?;
        let request = Request::new(id.clone(), self.resource.clone(), target, method)
            .with_parameters(parameters);

        let (tx, rx) = oneshot::channel();
        {
            let mut guard = self.inner.pending.lock().await;
            guard.insert(
                id.clone(),
                Waiter {
                    tx,
                    origin: self.resource.clone(),
                },
            );
        }

        if self.inner.outbound.send(Blob::Request(request)).is_err() {
            self.inner.pending.lock().await.remove(&id);
            return Err(GuestError::ChannelClosed);
        }

        rx.await.map_err(|_| GuestError::ChannelClosed)?
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}
