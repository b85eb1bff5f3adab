use crate::error::RouterError;

/// External validator hook consulted before a resource's source is ever
/// handed to a supervisor. Out of scope (spec.md's Non-goals exclude a
/// real code-review/sandboxing pipeline) but the seam is real: a
/// production deployment plugs in whatever policy it needs here.
pub trait Validator: Send + Sync {
    fn validate(&self, source: &str) -> Result<(), RouterError>;
}

/// The permissive stub used by tests and `warren-server`'s default wiring.
pub struct AllowAll;

impl Validator for AllowAll {
    fn validate(&self, _source: &str) -> Result<(), RouterError> {
        Ok(())
    }
}
