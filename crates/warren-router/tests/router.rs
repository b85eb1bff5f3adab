
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use warren_dispatch::dispatch;
use warren_proto::{Request, ShortDesc};
use warren_router::{AllowAll, OutputSink, Router, Subscription, VOID_ID};
use warren_store::{MemoryStore, Resource, Store};
use warren_supervisor::LaunchSpec;

use fixture::{guest_source_path, write_resource_guest};

struct NullSink;

#[async_trait]
impl OutputSink for NullSink {
    async fn send(&self, _message: String) -> Result<(), std::io::Error> {
        Ok(())
    }
}

async fn new_router() -> (Arc<Router>, tempfile::TempDir) {
    let (dir, script) = write_resource_guest();
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let launch = LaunchSpec::new("python3").arg(script);
    let router = Router::new(store, launch, Duration::from_millis(200), Arc::new(AllowAll));
    router.ensure_void().await.expect("ensure void");
    (router, dir)
}

async fn seed_sibling(router: &Router, id: &str, source: &str) {
    router
        .store()
        .put(Resource::new(id, "alice", source).with_container(VOID_ID))
        .await
        .unwrap();
    let mut void = router.store().get(VOID_ID).await.unwrap();
    void.content.push(id.to_string());
    router.store().put(void).await.unwrap();
    router.construct(id).await.expect("construct sibling");
}

#[tokio::test]
async fn ensure_void_is_idempotent() {
    let (router, _dir) = new_router().await;
    router.ensure_void().await.expect("second ensure_void");
    let void = router.store().get(VOID_ID).await.unwrap();
    assert_eq!(void.owner, "system");
}

#[tokio::test]
async fn siblings_under_void_are_neighbors() {
    let (router, _dir) = new_router().await;
    seed_sibling(&router, "a", "guest-a-source").await;
    seed_sibling(&router, "b", "guest-b-source").await;

    let handlers = router.resolve("a", "b").await.expect("neighbors resolve");
    assert_eq!(handlers.len(), 1, "cross-resource call carries no self adapter");

    let request = Request::new("r1", "a", "b", "Ping").with_parameters("[]");
    let response = dispatch(&handlers, request).await;
    assert!(response.header.error.is_none());
    assert_eq!(response.result, r#"["pong"]"#);
}

#[tokio::test]
async fn self_call_prepends_the_resource_adapter() {
    let (router, _dir) = new_router().await;
    seed_sibling(&router, "a", "guest-a-source").await;

    let handlers = router.resolve("a", "a").await.expect("self resolves");
    assert_eq!(handlers.len(), 2, "host adapter ahead of the guest's own proxy");

    let request = Request::new("r1", "a", "a", "GetContainer").with_parameters("[]");
    let response = dispatch(&handlers, request).await;
    assert!(response.header.error.is_none());
    assert_eq!(response.result, format!(r#"["{VOID_ID}"]"#));
}

#[tokio::test]
async fn unrelated_resources_are_rejected() {
    let (router, _dir) = new_router().await;
    seed_sibling(&router, "a", "guest-a-source").await;
    // "orphan" has no container at all, so it shares no neighbor relation with "a".
    router
        .store()
        .put(Resource::new("orphan", "alice", "guest-orphan-source"))
        .await
        .unwrap();
    router.construct("orphan").await.expect("construct orphan");

    let err = router.resolve("a", "orphan").await.unwrap_err();
    assert!(matches!(err, warren_router::RouterError::UnavailableResource));
}

#[tokio::test]
async fn broadcast_delivers_to_subscribed_container_members() {
    let (router, _dir) = new_router().await;
    seed_sibling(&router, "a", "guest-a-source").await;
    seed_sibling(&router, "b", "guest-b-source").await;

    router
        .subscribe(Subscription::compile("b", ".*", ".*", ".*", "OnEvent").unwrap())
        .await;

    let request = Request::new("evt1", "a", "a", "Look").with_parameters("[]");
    router
        .broadcast_request("a", ShortDesc::new("Alice"), request)
        .await
        .expect("broadcast");

    // give the concurrent delivery task a moment to land.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let events_path = guest_source_path("guest-b-source").with_extension("guest.events");
    let logged = fs::read_to_string(&events_path).unwrap_or_default();
    assert!(logged.contains("\"event_type\":\"Request\""));
    assert!(logged.contains("\"source\":\"a\""));
}

#[tokio::test]
async fn broadcast_notifies_the_actors_own_registered_client() {
    let (router, _dir) = new_router().await;
    seed_sibling(&router, "a", "guest-a-source").await;
    seed_sibling(&router, "b", "guest-b-source").await;

    // "a" never subscribes to anything, but it does register a client
    // adapter -- it should still observe its own action (spec scenario
    // S4), independent of the subscription table.
    router.register_client("a", Arc::new(NullSink)).await;

    let request = Request::new("evt1", "a", "a", "LookAt").with_parameters("[]");
    router
        .broadcast_request("a", ShortDesc::new("Alice"), request)
        .await
        .expect("broadcast");

    tokio::time::sleep(Duration::from_millis(200)).await;

    let events_path = guest_source_path("guest-a-source").with_extension("guest.events");
    let logged = fs::read_to_string(&events_path).unwrap_or_default();
    assert!(logged.contains("\"source\":\"a\""));
}

#[tokio::test]
async fn decommission_stops_the_supervisor_when_refcount_hits_zero() {
    let (router, _dir) = new_router().await;
    seed_sibling(&router, "a", "guest-a-source").await;

    router.decommission("a").await.expect("decommission");
    let err = router.resolve("a", "a").await.unwrap_err();
    assert!(matches!(err, warren_router::RouterError::NoSuchResource(_)));
}
