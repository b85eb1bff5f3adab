use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::Value;

use warren_dispatch::{decode0, decode4, encode_value, DispatchError, Dispatchable, MethodTable, MethodTableBuilder};
use warren_proto::ErrorCode;

use crate::router::Router;
use crate::subscribe::Subscription;

/// Stands in for the out-of-scope TCP connection: whatever actually
/// writes rendered text to a client implements this (spec §4.7's
/// `SendToClient`).
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn send(&self, message: String) -> Result<(), std::io::Error>;
}

fn database_error(err: impl std::fmt::Display) -> DispatchError {
    DispatchError::Wire(warren_proto::Error::new(ErrorCode::Database, err.to_string()))
}

fn subscribe_table() -> MethodTableBuilder {
    MethodTableBuilder::new()
}

/// `GetContainer`/`GetContent`/`Subscribe`/`EmitEvent`, read straight from
/// the store and the router's subscription table (spec §4.7).
fn base_methods(resource: String, router: Weak<Router>) -> MethodTableBuilder {
    let mut builder = subscribe_table();

    let r = resource.clone();
    let rt = router.clone();
    builder = builder.method("GetContainer", move |params| {
        let resource = r.clone();
        let router = rt.clone();
        async move {
            decode0(&params)?;
            let router = router.upgrade().ok_or_else(|| database_error("router dropped"))?;
            let value = router
                .store()
                .get(&resource)
                .await
                .map_err(database_error)?
                .container
                .unwrap_or_default();
            encode_value(value)
        }
    });

    let r = resource.clone();
    let rt = router.clone();
    builder = builder.method("GetContent", move |params| {
        let resource = r.clone();
        let router = rt.clone();
        async move {
            decode0(&params)?;
            let router = router.upgrade().ok_or_else(|| database_error("router dropped"))?;
            let value = router.store().get(&resource).await.map_err(database_error)?.content;
            encode_value(value)
        }
    });

    let r = resource.clone();
    let rt = router.clone();
    builder = builder.method("Subscribe", move |params| {
        let resource = r.clone();
        let router = rt.clone();
        async move {
            let (verb, method, event_type, handler_method): (String, String, String, String) = decode4(&params)?;
            let router = router.upgrade().ok_or_else(|| database_error("router dropped"))?;
            let subscription = Subscription::compile(resource, &verb, &method, &event_type, handler_method)
                .map_err(|err| DispatchError::Wire(warren_proto::Error::new(ErrorCode::Regexp, err.to_string())))?;
            router.subscribe(subscription).await;
            encode_value(true)
        }
    });

    let r = resource.clone();
    let rt = router.clone();
    builder = builder.method("EmitEvent", move |params| {
        let resource = r.clone();
        let router = rt.clone();
        async move {
            let (event_type, metadata): (String, Value) = warren_dispatch::decode2(&params)?;
            let router = router.upgrade().ok_or_else(|| database_error("router dropped"))?;
            router
                .emit_custom_event(&resource, &event_type, metadata)
                .await
                .map_err(|err| DispatchError::Wire(warren_proto::Error::new(err.code(), err.to_string())))?;
            encode_value(true)
        }
    });

    builder
}

/// Basic host adapter for a resource's own methods (spec §4.7). Prepended
/// ahead of the guest's own handler whenever a request targets its own
/// resource id.
pub struct ResourceAdapter {
    table: MethodTable,
}

impl ResourceAdapter {
    pub fn new(resource: impl Into<String>, router: Weak<Router>) -> Self {
        Self {
            table: base_methods(resource.into(), router).build(),
        }
    }
}

impl Dispatchable for ResourceAdapter {
    fn method_table(&self) -> &MethodTable {
        &self.table
    }
}

/// Adds `SendToClient` over the base adapter methods, and is shared
/// between the (out-of-scope) front end and the router via a weak
/// reference (spec §3). Evicts itself from the router's client map on a
/// write failure.
pub struct ClientAdapter {
    table: MethodTable,
}

impl ClientAdapter {
    pub fn new(resource: impl Into<String>, router: Weak<Router>, sink: Arc<dyn OutputSink>) -> Self {
        let resource = resource.into();
        let mut builder = base_methods(resource.clone(), router.clone());

        builder = builder.method("SendToClient", move |params| {
            let resource = resource.clone();
            let router = router.clone();
            let sink = sink.clone();
            async move {
                let message: String = decode_message(&params)?;
                if let Err(err) = sink.send(message).await {
                    if let Some(router) = router.upgrade() {
                        router.unregister_client(&resource).await;
                    }
                    return Err(DispatchError::Wire(warren_proto::Error::new(
                        ErrorCode::SendToClient,
                        err.to_string(),
                    )));
                }
                encode_value(true)
            }
        });

        Self { table: builder.build() }
    }
}

impl Dispatchable for ClientAdapter {
    fn method_table(&self) -> &MethodTable {
        &self.table
    }
}

fn decode_message(params: &[Value]) -> Result<String, DispatchError> {
    warren_dispatch::decode1(params)
}
