use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::verb::Verb;

/// `{Id, Source, Verb?}` (spec §4.1/§6).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    pub id: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<Verb>,
}

/// `{id, source, verb?, resource, method, parameters}` (spec §4.1).
///
/// `parameters` is a JSON-encoded array *as a string*, re-parsed by the
/// dispatcher — not a nested JSON array — matching the original wire
/// format exactly (`proc/messages/messages.go`'s `Request.Parameters`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub header: RequestHeader,
    pub resource: String,
    pub method: String,
    #[serde(default)]
    pub parameters: String,
}

impl Request {
    pub fn new(id: impl Into<String>, source: impl Into<String>, resource: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            header: RequestHeader {
                id: id.into(),
                source: source.into(),
                verb: None,
            },
            resource: resource.into(),
            method: method.into(),
            parameters: String::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = parameters.into();
        self
    }

    pub fn with_verb(mut self, verb: Verb) -> Self {
        self.header.verb = Some(verb);
        self
    }
}

/// `{Id, Error?}` (spec §4.1/§6). `id` matches the originating request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

/// `{id, error?, result}` (spec §4.1).
///
/// `result` is a JSON-encoded array as a string, symmetric with
/// `Request::parameters`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub header: ResponseHeader,
    #[serde(default)]
    pub result: String,
}

impl Response {
    pub fn ok(id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            header: ResponseHeader {
                id: id.into(),
                error: None,
            },
            result: result.into(),
        }
    }

    pub fn err(id: impl Into<String>, error: Error) -> Self {
        Self {
            header: ResponseHeader {
                id: id.into(),
                error: Some(error),
            },
            result: String::new(),
        }
    }
}

/// `{Id, Resource, Deconstructed}` (spec §4.1). `deconstructed` is set by
/// the guest in the response direction to signal success; the field name
/// is shared between Construct and Destruct per spec §4.1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Construct {
    pub id: String,
    pub resource: String,
    #[serde(default)]
    pub deconstructed: bool,
}

impl Construct {
    pub fn new(id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource: resource.into(),
            deconstructed: false,
        }
    }
}

/// `{Id, Resource, Deconstructed}` (spec §4.1).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destruct {
    pub id: String,
    pub resource: String,
    #[serde(default)]
    pub deconstructed: bool,
}

impl Destruct {
    pub fn new(id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource: resource.into(),
            deconstructed: false,
        }
    }
}

/// A `Blob` carries exactly one of four payloads, discriminated by a type
/// tag (spec §4.1). Framing is one JSON value per line (spec §6).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Blob {
    Request(Request),
    Response(Response),
    Construct(Construct),
    Destruct(Destruct),
}

impl Blob {
    pub fn request_id(&self) -> &str {
        match self {
            Blob::Request(r) => &r.header.id,
            Blob::Response(r) => &r.header.id,
            Blob::Construct(c) => &c.id,
            Blob::Destruct(d) => &d.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips() {
        let blob = Blob::Request(
            Request::new("1", "alice", "bob", "GetShortDesc").with_parameters("[]"),
        );
        let json = serde_json::to_string(&blob).unwrap();
        let back: Blob = serde_json::from_str(&json).unwrap();
        assert_eq!(blob, back);
    }

    #[test]
    fn response_with_error_round_trips() {
        let blob = Blob::Response(Response::err(
            "1",
            crate::error::Error::new(crate::error::ErrorCode::NoSuchResource, "no such resource \"x\""),
        ));
        let json = serde_json::to_string(&blob).unwrap();
        let back: Blob = serde_json::from_str(&json).unwrap();
        assert_eq!(blob, back);
    }

    #[test]
    fn construct_and_destruct_round_trip() {
        for blob in [
            Blob::Construct(Construct::new("1", "alice")),
            Blob::Destruct(Destruct::new("2", "alice")),
        ] {
            let json = serde_json::to_string(&blob).unwrap();
            let back: Blob = serde_json::from_str(&json).unwrap();
            assert_eq!(blob, back);
        }
    }

    #[test]
    fn omitted_optional_fields_default() {
        let json = r#"{"type":"request","header":{"id":"1","source":"alice"},"resource":"bob","method":"Look","parameters":""}"#;
        let blob: Blob = serde_json::from_str(json).unwrap();
        match blob {
            Blob::Request(r) => assert!(r.header.verb.is_none()),
            _ => panic!("expected request"),
        }
    }
}
