//! Wire envelope for the warren resource-runtime protocol.
//!
//! Defines the `Blob` tagged union (`Request`/`Response`/`Construct`/
//! `Destruct`), the closed `ErrorCode` vocabulary, verbs, short
//! descriptions, events, and the newline-delimited JSON framing shared by
//! both sides of the host/child boundary. Pure data and codec — no
//! process management, no dispatch.

mod envelope;
mod error;
mod event;
mod framing;
mod short_desc;
mod verb;

pub use envelope::{Blob, Construct, Destruct, Request, RequestHeader, Response, ResponseHeader};
pub use error::{Error, ErrorCode};
pub use event::{Event, EventType};
pub use framing::{decode_blob, encode_blob, FramingError};
pub use short_desc::ShortDesc;
pub use verb::Verb;
