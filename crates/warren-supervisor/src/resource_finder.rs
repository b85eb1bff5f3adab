use async_trait::async_trait;
use warren_dispatch::Handler;

use crate::error::SupervisorError;

/// The host-side resolver a supervisor consults when its child emits a
/// `Request` blob (the guest calling *out* through its `Mcp` capability).
/// Implemented by the router; a supervisor never resolves handlers
/// itself (spec §4.4's read loop: "Request → route through the dispatcher
/// with the host's resource finder").
#[async_trait]
pub trait ResourceFinder: Send + Sync {
    async fn handlers(&self, source: &str, target: &str) -> Result<Vec<Handler>, SupervisorError>;
}
