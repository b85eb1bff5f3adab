//! The guest-side driver: runs inside each spawned interpreter child,
//! owns the live handler registry, applies kernel resource limits, and
//! exposes the [`Mcp`] outbound-call capability handlers use to reach
//! across the wire back to the host.

mod driver;
mod error;
mod limits;
mod mcp;
mod short_desc_cache;

pub use driver::{Factory, GuestDriver};
pub use error::GuestError;
pub use limits::GuestLimits;
pub use mcp::Mcp;
pub use short_desc_cache::ShortDescCache;
