use serde_json::Value;

use crate::resource::Resource;

/// An explicit field/value equality filter — the structural replacement
/// for the original's reflective field-equality filter (spec §6's
/// `Find(filter)`; Design Notes §9's "replace reflection with explicit
/// structure").
#[derive(Clone, Debug, Default)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// True if every clause matches the resource's corresponding field.
    /// Unknown field names never match (closed field set, no reflection).
    pub fn matches(&self, resource: &Resource) -> bool {
        self.clauses.iter().all(|(field, value)| match field.as_str() {
            "id" => value.as_str() == Some(resource.id.as_str()),
            "owner" => value.as_str() == Some(resource.owner.as_str()),
            "container" => match (value.as_str(), &resource.container) {
                (Some(v), Some(c)) => v == c,
                (None, None) => value.is_null(),
                _ => false,
            },
            _ => false,
        })
    }
}
