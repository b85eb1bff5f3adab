//! The central broker (spec §4.5–§4.8): supervisor pooling, neighbor-
//! scoped resource resolution, event fan-out, host-side resource
//! adapters, and fuzzy name resolution.

mod adapters;
mod error;
mod identify;
mod pool;
mod router;
mod subscribe;
mod validate;

pub use adapters::{ClientAdapter, OutputSink, ResourceAdapter};
pub use error::RouterError;
pub use identify::identify;
pub use router::{Router, VOID_ID};
pub use subscribe::{Subscription, SubscriptionTable};
pub use validate::{AllowAll, Validator};
