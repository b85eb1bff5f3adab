use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use warren_dispatch::{dispatch, Dispatchable, Handler};
use warren_proto::{Blob, Construct, Destruct, Error as WireError, ErrorCode, Request};

use crate::error::GuestError;
use crate::mcp::{Mcp, McpInner};

/// The guest program's single entry point: build a handler for a freshly
/// constructed resource, given its outbound-call capability (spec §4.3:
/// "a single registered factory... the guest program's `New(mcp)`
/// function").
pub type Factory = Arc<dyn Fn(Mcp) -> Arc<dyn Dispatchable> + Send + Sync>;

/// Runs inside a child process. Owns the live handler registry, the
/// shared outbound-call state, and the blobs-out sink written by the
/// supervisor's read loop.
pub struct GuestDriver {
    factory: Factory,
    handlers: Mutex<HashMap<String, Arc<dyn Dispatchable>>>,
    mcp_inner: Arc<McpInner>,
    outbound: mpsc::UnboundedSender<Blob>,
}

impl GuestDriver {
    pub fn new(factory: Factory, outbound: mpsc::UnboundedSender<Blob>) -> Self {
        Self {
            factory,
            handlers: Mutex::new(HashMap::new()),
            mcp_inner: McpInner::new(outbound.clone()),
            outbound,
        }
    }

    /// Top-level entry point for a decoded inbound [`Blob`]; mirrors the
    /// supervisor's read-loop dispatch by type (spec §4.4, mirrored on the
    /// child side).
    pub async fn handle(&self, blob: Blob) {
        match blob {
            Blob::Request(request) => self.handle_request(request).await,
            Blob::Response(response) => {
                let result = if let Some(err) = response.header.error {
                    Err(GuestError::Wire(err))
                } else {
                    warren_dispatch::split_parameters(&response.result)
                        .map_err(GuestError::from)
                };
                self.mcp_inner.resolve(&response.header.id, result).await;
            }
            Blob::Construct(construct) => self.handle_construct(construct).await,
            Blob::Destruct(destruct) => self.handle_destruct(destruct).await,
        }
    }

    async fn handle_request(&self, request: Request) {
        let handler = { self.handlers.lock().await.get(&request.resource).cloned() };

        let response = match handler {
            Some(handler) => dispatch(&[Handler::Local(handler)], request.clone()).await,
            None => warren_proto::Response::err(
                request.header.id.clone(),
                WireError::new(
                    ErrorCode::NoSuchResource,
                    format!("no such resource {:?}", request.resource),
                ),
            ),
        };

        let _ = self.outbound.send(Blob::Response(response));
    }

    async fn handle_construct(&self, mut construct: Construct) {
        let mut guard = self.handlers.lock().await;
        construct.deconstructed = if guard.contains_key(&construct.resource) {
            false
        } else {
            let mcp = Mcp::new(construct.resource.clone(), self.mcp_inner.clone());
            let handler = (self.factory)(mcp);
            guard.insert(construct.resource.clone(), handler);
            true
        };
        drop(guard);
        let _ = self.outbound.send(Blob::Construct(construct));
    }

    async fn handle_destruct(&self, mut destruct: Destruct) {
        let removed = self.handlers.lock().await.remove(&destruct.resource);
        destruct.deconstructed = removed.is_some();
        if let Some(handler) = &removed {
            if let Some(teardown) = handler.teardown() {
                tokio::spawn(teardown);
            }
        }
        self.mcp_inner.abandon(&destruct.resource).await;
        let _ = self.outbound.send(Blob::Destruct(destruct));
    }

    pub async fn resource_count(&self) -> usize {
        self.handlers.lock().await.len()
    }
}
