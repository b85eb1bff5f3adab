use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::Request;
use crate::short_desc::ShortDesc;

/// Type tag of an `Event` (spec §3: `Request | Construct | Destruct | Say | …`).
///
/// Modeled as a newtype over `String` rather than a closed enum: guest
/// code is free to broadcast custom event types (`Say`, `Emote`, ...), and
/// the subscription matcher (spec §4.6) matches against the type purely
/// as a string via regex, so there is no closed set to enumerate here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub String);

impl EventType {
    pub const REQUEST: &'static str = "Request";
    pub const CONSTRUCT: &'static str = "Construct";
    pub const DESTRUCT: &'static str = "Destruct";

    pub fn request() -> Self {
        Self(Self::REQUEST.to_string())
    }

    pub fn construct() -> Self {
        Self(Self::CONSTRUCT.to_string())
    }

    pub fn destruct() -> Self {
        Self(Self::DESTRUCT.to_string())
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_request(&self) -> bool {
        self.0 == Self::REQUEST
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type tag, source resource id, cached source short-description,
/// metadata map, and — for request events — the originating request
/// (spec §3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub source: String,
    pub source_short_desc: ShortDesc,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
}

impl Event {
    pub fn request_event(source: impl Into<String>, source_short_desc: ShortDesc, request: Request) -> Self {
        Self {
            event_type: EventType::request(),
            source: source.into(),
            source_short_desc,
            metadata: HashMap::new(),
            request: Some(request),
        }
    }

    pub fn lifecycle(event_type: EventType, source: impl Into<String>, source_short_desc: ShortDesc) -> Self {
        Self {
            event_type,
            source: source.into(),
            source_short_desc,
            metadata: HashMap::new(),
            request: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
