mod fixture;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use sha1::{Digest, Sha1};
use warren_proto::Request;
use warren_supervisor::{LaunchSpec, Supervisor};

use fixture::{write_outbound_guest, RejectingResourceFinder};

/// A resource finder failure on a guest's outbound call must carry its
/// structured error code back to the guest, not collapse into a generic
/// `NoSuchMethod` from dispatching against an empty handler chain.
#[tokio::test]
async fn resource_finder_failure_preserves_its_error_code() {
    let (_dir, script) = write_outbound_guest();
    let launch = LaunchSpec::new("python3").arg(script);
    let supervisor = Supervisor::new(
        "outbound-guest-source",
        launch,
        Arc::new(RejectingResourceFinder),
        Duration::from_secs(5),
    );
    supervisor.start().await.expect("start supervisor");
    supervisor.construct("alice").await.expect("construct");

    let trigger = Request::new("r1", "bob", "alice", "Trigger").with_parameters("[]");
    let response = supervisor.call(trigger).await.expect("call");
    assert!(response.header.error.is_none());
    assert_eq!(response.result, r#"["done"]"#);

    // give the guest a moment to receive and log the response to its own
    // outbound request before inspecting it.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let outbound_path = guest_source_path("outbound-guest-source").with_extension("guest.outbound");
    let logged = fs::read_to_string(&outbound_path).unwrap_or_default();
    assert!(logged.contains("\"code\":\"UnavailableResource\""), "logged: {logged}");

    supervisor.stop().await;
}

/// Reconstructs the hash-named temp path `Supervisor::new` writes a
/// resource's source text to, so the test can locate the sibling
/// `.outbound` log without reaching into the supervisor's private fields.
fn guest_source_path(source: &str) -> std::path::PathBuf {
    let mut hasher = Sha1::new();
    hasher.update(source.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    std::env::temp_dir().join(format!("warren-{hex}.guest"))
}
