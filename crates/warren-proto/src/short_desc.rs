use serde::{Deserialize, Serialize};

/// A value string plus grouping/article flags, used for enumeration and
/// prose rendering (spec §3).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortDesc {
    pub value: String,
    /// Definite article only; never pluralized or grouped with siblings.
    pub unique: bool,
    /// Proper noun; rendered with no article at all.
    pub name: bool,
}

impl ShortDesc {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            unique: false,
            name: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn name(mut self) -> Self {
        self.name = true;
        self
    }
}
