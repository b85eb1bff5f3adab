mod fixture;

use std::sync::Arc;
use std::time::Duration;

use warren_proto::Request;
use warren_supervisor::{LaunchSpec, Supervisor};

use fixture::{write_echo_guest, NullResourceFinder};

#[tokio::test]
async fn construct_call_destruct_round_trip() {
    let (_dir, script) = write_echo_guest();
    let launch = LaunchSpec::new("python3").arg(script.clone());
    let supervisor = Supervisor::new(
        "echo-guest-source",
        launch,
        Arc::new(NullResourceFinder),
        Duration::from_secs(5),
    );
    supervisor.start().await.expect("start supervisor");

    let constructed = supervisor.construct("alice").await.expect("construct");
    assert!(constructed);
    assert_eq!(supervisor.refcount(), 1);

    let request = Request::new("r1", "bob", "alice", "Ping").with_parameters("[]");
    let response = supervisor.call(request).await.expect("call");
    assert!(response.header.error.is_none());
    assert_eq!(response.result, r#"["pong"]"#);

    let destructed = supervisor.destruct("alice").await.expect("destruct");
    assert!(destructed);
    assert_eq!(supervisor.refcount(), 0);

    supervisor.stop().await;
}

#[tokio::test]
async fn stopped_supervisor_refuses_calls() {
    let (_dir, script) = write_echo_guest();
    let launch = LaunchSpec::new("python3").arg(script.clone());
    let supervisor = Supervisor::new(
        "echo-guest-source",
        launch,
        Arc::new(NullResourceFinder),
        Duration::from_secs(5),
    );
    supervisor.start().await.expect("start supervisor");
    supervisor.stop().await;

    let err = supervisor.construct("alice").await.unwrap_err();
    assert!(matches!(err, warren_supervisor::SupervisorError::Stopped));
}

#[tokio::test]
async fn child_death_triggers_cooldown_restart() {
    let (_dir, script) = write_echo_guest();
    let launch = LaunchSpec::new("python3").arg(script.clone());
    let supervisor = Supervisor::new(
        "echo-guest-source",
        launch,
        Arc::new(NullResourceFinder),
        Duration::from_millis(200),
    );
    supervisor.start().await.expect("start supervisor");

    supervisor.construct("alice").await.expect("construct");

    let boom = Request::new("r2", "bob", "alice", "Boom").with_parameters("[]");
    let result = supervisor.call(boom).await;
    assert!(result.is_err(), "crashing the child should surface a transport error");

    tokio::time::sleep(Duration::from_millis(600)).await;

    let constructed = supervisor.construct("alice").await.expect("construct after restart");
    assert!(constructed);

    supervisor.stop().await;
}
