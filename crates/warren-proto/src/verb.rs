use serde::{Deserialize, Serialize};

/// A labeled action attached to a cross-resource request (spec §3, §4.1).
///
/// `second_person`/`third_person` render client prose ("look at" vs.
/// "looks at"); `transitive` governs whether a target short-desc is
/// expected to follow the verb when rendering an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verb {
    pub second_person: String,
    pub third_person: String,
    pub transitive: bool,
}

impl Verb {
    pub fn new(
        second_person: impl Into<String>,
        third_person: impl Into<String>,
        transitive: bool,
    ) -> Self {
        Self {
            second_person: second_person.into(),
            third_person: third_person.into(),
            transitive,
        }
    }
}
