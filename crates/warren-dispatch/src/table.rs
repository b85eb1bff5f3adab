use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use warren_proto::Request;

use crate::error::DispatchError;

/// The live request, handed to a handler method that registered with
/// [`MethodTableBuilder::method_with_context`] (spec §4.2 step 3:
/// "If the method's first formal parameter is of type `Context`...").
#[derive(Clone, Debug)]
pub struct Context {
    pub request: Request,
}

type BoxFut = Pin<Box<dyn Future<Output = Result<Vec<Value>, DispatchError>> + Send>>;

enum Entry {
    Plain(Arc<dyn Fn(Vec<Value>) -> BoxFut + Send + Sync>),
    Context(Arc<dyn Fn(Context, Vec<Value>) -> BoxFut + Send + Sync>),
}

/// A per-resource dispatch table populated once at construction — the
/// reflection-free restatement of spec §4.2 (Design Notes §9: "replace
/// the dispatcher with a per-resource dispatch table populated at
/// construction").
#[derive(Clone, Default)]
pub struct MethodTable {
    entries: HashMap<&'static str, Entry>,
}

impl MethodTable {
    pub(crate) async fn invoke(
        &self,
        method: &str,
        context: Context,
        params: Vec<Value>,
    ) -> Result<Vec<Value>, DispatchError> {
        match self.entries.get(method) {
            Some(Entry::Plain(f)) => f(params).await,
            Some(Entry::Context(f)) => f(context, params).await,
            None => Err(DispatchError::NoSuchMethod(method.to_string())),
        }
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.entries.contains_key(method)
    }
}

/// Builds a [`MethodTable`]. Each registered method owns its own arity
/// check and parameter decode (via [`crate::params`] helpers) — there is
/// no central reflective arity inspection, by design (see module docs).
#[derive(Default)]
pub struct MethodTableBuilder {
    entries: HashMap<&'static str, Entry>,
}

impl MethodTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method<F, Fut>(mut self, name: &'static str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Value>, DispatchError>> + Send + 'static,
    {
        self.entries
            .insert(name, Entry::Plain(Arc::new(move |params| Box::pin(f(params)))));
        self
    }

    pub fn method_with_context<F, Fut>(mut self, name: &'static str, f: F) -> Self
    where
        F: Fn(Context, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Value>, DispatchError>> + Send + 'static,
    {
        self.entries
            .insert(name, Entry::Context(Arc::new(move |ctx, params| Box::pin(f(ctx, params)))));
        self
    }

    pub fn build(self) -> MethodTable {
        MethodTable {
            entries: self.entries,
        }
    }
}
