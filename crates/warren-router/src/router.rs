use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::RwLock;

use warren_dispatch::{DispatchError, Dispatchable, Handler, ProxySender};
use warren_proto::{ErrorCode, Event, EventType, Request, Response, ShortDesc};
use warren_store::{Resource, Store};
use warren_supervisor::{LaunchSpec, ResourceFinder, Supervisor, SupervisorError};

use crate::adapters::{ClientAdapter, OutputSink, ResourceAdapter};
use crate::error::RouterError;
use crate::pool::Pool;
use crate::subscribe::{Subscription, SubscriptionTable};
use crate::validate::Validator;

/// The well-known root container (spec §3 invariant (b), §4.5 item 5).
pub const VOID_ID: &str = "0";
const VOID_SOURCE: &str = "";

/// Handler method invoked on the acting resource's own registered client
/// adapter so it can render its own action (spec scenario S4: "alice's
/// own client adapter receives `EventTypeRequest`"), independent of the
/// normal subscription table.
const SELF_NOTIFY_METHOD: &str = "OnEvent";

type ProxyFuture = Pin<Box<dyn Future<Output = Result<Response, DispatchError>> + Send>>;

/// The central broker (spec §4.5): owns the supervisor pool, the
/// subscription table, and the registry of live client adapters. Always
/// handled behind an `Arc` — it hands a weak reference to itself to every
/// adapter and to its own `ResourceFinder` implementation so a supervisor
/// can route a guest's outbound call back through here.
pub struct Router {
    store: Arc<dyn Store>,
    pool: Pool,
    subscriptions: SubscriptionTable,
    clients: RwLock<HashMap<String, Weak<ClientAdapter>>>,
    next_id: AtomicU64,
    self_weak: Weak<Router>,
}

impl Router {
    pub fn new(
        store: Arc<dyn Store>,
        launch: LaunchSpec,
        cooldown: Duration,
        validator: Arc<dyn Validator>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Router>| {
            let finder: Arc<dyn ResourceFinder> = Arc::new(RouterFinder(weak.clone()));
            Router {
                store,
                pool: Pool::new(launch, cooldown, validator, finder),
                subscriptions: SubscriptionTable::new(),
                clients: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                self_weak: weak.clone(),
            }
        })
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    fn fresh_id(&self) -> String {
        format!("{:x}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Ensures the void resource exists and is constructed (spec §4.5
    /// item 5). Safe to call more than once; construct is idempotent.
    pub async fn ensure_void(&self) -> Result<(), RouterError> {
        if self.store.get(VOID_ID).await.is_err() {
            self.store
                .put(Resource::new(VOID_ID, "system", VOID_SOURCE))
                .await?;
        }
        self.construct(VOID_ID).await
    }

    /// Binds `id` to a (possibly shared) supervisor and issues a
    /// `Construct` through it (spec §4.5 item 1).
    pub async fn construct(&self, id: &str) -> Result<(), RouterError> {
        let resource = self.store.get(id).await?;
        let supervisor = self.pool.bind(id, &resource.owner, &resource.source).await?;
        supervisor.construct(id).await?;
        Ok(())
    }

    /// Snapshots the short-desc, destructs, broadcasts `Destruct`, and
    /// evicts from the resource map; stops the supervisor if its refcount
    /// reaches zero (spec §4.5 item 4).
    pub async fn decommission(&self, id: &str) -> Result<(), RouterError> {
        let resource = self.store.get(id).await?;
        let short_desc = self.fetch_short_desc(id).await;

        if let Some(supervisor) = self.pool.supervisor_for(id).await {
            let _ = supervisor.destruct(id).await;
        }

        if resource.container.is_some() {
            let event = Event::lifecycle(EventType::destruct(), id, short_desc);
            let _ = self.broadcast(id, event).await;
        }

        if let Some((supervisor, should_stop)) = self.pool.unbind(id).await {
            if should_stop {
                supervisor.stop().await;
            }
        }
        Ok(())
    }

    /// Decommissions then recreates on next access (spec §4.5 item 4).
    pub async fn restart(&self, id: &str) -> Result<(), RouterError> {
        self.decommission(id).await?;
        self.construct(id).await
    }

    pub async fn register_client(&self, resource: impl Into<String>, sink: Arc<dyn OutputSink>) -> Arc<ClientAdapter> {
        let resource = resource.into();
        let adapter = Arc::new(ClientAdapter::new(resource.clone(), self.self_weak.clone(), sink));
        self.clients.write().await.insert(resource, Arc::downgrade(&adapter));
        adapter
    }

    pub async fn unregister_client(&self, resource: &str) {
        self.clients.write().await.remove(resource);
    }

    async fn client_for(&self, resource: &str) -> Option<Arc<dyn Dispatchable>> {
        let weak = self.clients.read().await.get(resource)?.clone();
        weak.upgrade().map(|arc| arc as Arc<dyn Dispatchable>)
    }

    pub async fn subscribe(&self, subscription: Subscription) {
        self.subscriptions.subscribe(subscription).await;
    }

    async fn enforce_neighbor(&self, source: &str, target: &str) -> Result<(), RouterError> {
        if source == target {
            return Ok(());
        }
        let source_container = self.store.get(source).await.ok().and_then(|r| r.container);
        let target_container = self.store.get(target).await.ok().and_then(|r| r.container);

        let neighbors = target_container.as_deref() == Some(source)
            || source_container.as_deref() == Some(target)
            || matches!((&source_container, &target_container), (Some(a), Some(b)) if a == b);

        if neighbors {
            Ok(())
        } else {
            Err(RouterError::UnavailableResource)
        }
    }

    /// Builds the ordered handler chain for a `(source, target)` call
    /// (spec §4.5 item 2): host adapter prepended on self-calls, a proxy
    /// to the target's supervisor always appended, gated by the neighbor
    /// predicate.
    pub async fn resolve(&self, source: &str, target: &str) -> Result<Vec<Handler>, RouterError> {
        self.enforce_neighbor(source, target).await?;

        let mut handlers = Vec::new();
        if source == target {
            let adapter = match self.client_for(target).await {
                Some(client) => client,
                None => Arc::new(ResourceAdapter::new(target, self.self_weak.clone())) as Arc<dyn Dispatchable>,
            };
            handlers.push(Handler::Local(adapter));
        }

        let supervisor = self
            .pool
            .supervisor_for(target)
            .await
            .ok_or_else(|| RouterError::NoSuchResource(target.to_string()))?;
        handlers.push(Handler::Proxy(proxy_for(supervisor)));
        Ok(handlers)
    }

    /// Broadcasts a request event to the source's container (spec §4.5
    /// item 3).
    pub async fn broadcast_request(&self, source: &str, short_desc: ShortDesc, request: Request) -> Result<(), RouterError> {
        self.broadcast(source, Event::request_event(source, short_desc, request)).await
    }

    pub async fn emit_custom_event(&self, source: &str, event_type: &str, metadata: serde_json::Value) -> Result<(), RouterError> {
        let short_desc = self.fetch_short_desc(source).await;
        let mut event = Event::lifecycle(EventType::custom(event_type), source, short_desc);
        if let serde_json::Value::Object(map) = metadata {
            for (key, value) in map {
                event = event.with_metadata(key, value);
            }
        }
        self.broadcast(source, event).await
    }

    async fn broadcast(&self, source: &str, event: Event) -> Result<(), RouterError> {
        let resource = self.store.get(source).await?;
        let Some(container_id) = resource.container.clone() else {
            return Ok(());
        };
        let container = self.store.get(&container_id).await?;

        let matches = self.subscriptions.matching(&event, source).await;
        let matches: HashMap<String, String> = matches.into_iter().collect();

        let mut deliveries: Vec<_> = container
            .content
            .iter()
            .filter(|id| id.as_str() != source)
            .filter_map(|id| matches.get(id).map(|handler_method| (id.clone(), handler_method.clone())))
            .collect();

        // The acting resource's own client, if one is connected, always
        // observes its own action so it can render "you VERB" narration
        // (spec scenario S4) -- this is a direct side channel, not a
        // subscription match.
        if self.clients.read().await.contains_key(source) {
            deliveries.push((source.to_string(), SELF_NOTIFY_METHOD.to_string()));
        }

        let tasks = deliveries.into_iter().map(|(subscriber, handler_method)| {
            let event = event.clone();
            async move {
                self.deliver(&subscriber, &handler_method, &event).await;
            }
        });
        join_all(tasks).await;
        Ok(())
    }

    async fn deliver(&self, subscriber: &str, handler_method: &str, event: &Event) {
        let Some(supervisor) = self.pool.supervisor_for(subscriber).await else {
            self.subscriptions.unsubscribe(subscriber).await;
            return;
        };

        let parameters = match serde_json::to_string(&[event]) {
            Ok(p) => p,
            Err(_) => return,
        };
        let request = Request::new(self.fresh_id(), subscriber, subscriber, handler_method).with_parameters(parameters);

        let keep = match supervisor.call(request).await {
            Ok(response) if response.header.error.is_none() => serde_json::from_str::<Vec<bool>>(&response.result)
                .ok()
                .and_then(|mut v| v.pop())
                .unwrap_or(false),
            _ => false,
        };
        if !keep {
            self.subscriptions.unsubscribe(subscriber).await;
        }
    }

    async fn fetch_short_desc(&self, id: &str) -> ShortDesc {
        let Some(supervisor) = self.pool.supervisor_for(id).await else {
            return ShortDesc::new(id);
        };
        let request = Request::new(self.fresh_id(), id, id, "GetShortDesc");
        match supervisor.call(request).await {
            Ok(response) if response.header.error.is_none() => serde_json::from_str::<Vec<ShortDesc>>(&response.result)
                .ok()
                .and_then(|mut v| v.pop())
                .unwrap_or_else(|| ShortDesc::new(id)),
            _ => ShortDesc::new(id),
        }
    }
}

/// Adapts [`Router::resolve`] to the [`ResourceFinder`] seam a supervisor
/// needs for guest-originated outbound calls.
struct RouterFinder(Weak<Router>);

#[async_trait]
impl ResourceFinder for RouterFinder {
    async fn handlers(&self, source: &str, target: &str) -> Result<Vec<Handler>, SupervisorError> {
        let router = self.0.upgrade().ok_or_else(|| SupervisorError::ResourceFinder {
            code: ErrorCode::UnavailableResource,
            message: "router dropped".into(),
        })?;
        router.resolve(source, target).await.map_err(|err| SupervisorError::ResourceFinder {
            code: err.code(),
            message: err.to_string(),
        })
    }
}

fn proxy_for(supervisor: Arc<Supervisor>) -> ProxySender {
    Arc::new(move |request: Request| {
        let supervisor = supervisor.clone();
        Box::pin(async move {
            supervisor
                .call(request)
                .await
                .map_err(|err| DispatchError::ProxyFailed(err.to_string()))
        }) as ProxyFuture
    })
}
