use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use warren_proto::{Error as WireError, ErrorCode, Request, Response};

use crate::error::DispatchError;
use crate::params::split_parameters;
use crate::table::{Context, MethodTable};

/// A value with named callable members (spec §4.2: "a resource ... with
/// named callable members").
pub trait Dispatchable: Send + Sync {
    fn method_table(&self) -> &MethodTable;

    /// Optional async teardown, run once on `Destruct` and never awaited by
    /// the caller (fire-and-forget, analogous to a `Drop` hook that needs
    /// to do real async work). Resources without one don't need to
    /// override this. The returned future must be `'static` since it
    /// outlives the call to this method; implementations that need their
    /// own state should capture an owned clone of it.
    fn teardown(&self) -> Option<Pin<Box<dyn Future<Output = ()> + Send>>> {
        None
    }
}

type ProxyFuture = Pin<Box<dyn Future<Output = Result<Response, DispatchError>> + Send>>;

/// A proxy capability: `SendRequest(req) -> (resp, err)` (spec §4.2).
pub type ProxySender = Arc<dyn Fn(Request) -> ProxyFuture + Send + Sync>;

/// One candidate in the resolver's ordered list (spec §4.2, Design Notes
/// §9's "ordered handler chains").
#[derive(Clone)]
pub enum Handler {
    Local(Arc<dyn Dispatchable>),
    Proxy(ProxySender),
}

fn error_response(request: &Request, code: ErrorCode, message: impl Into<String>) -> Response {
    Response::err(request.header.id.clone(), WireError::new(code, message))
}

fn is_no_such_method(response: &Response) -> bool {
    response
        .header
        .error
        .as_ref()
        .is_some_and(|e| e.code == ErrorCode::NoSuchMethod)
}

async fn call_local(resource: &dyn Dispatchable, request: &Request) -> Result<Response, DispatchError> {
    let table = resource.method_table();
    if !table.has_method(&request.method) {
        return Err(DispatchError::NoSuchMethod(request.method.clone()));
    }
    let params = split_parameters(&request.parameters)?;
    let context = Context {
        request: request.clone(),
    };
    let values = table.invoke(&request.method, context, params).await?;
    let result = serde_json::to_string(&values).map_err(DispatchError::EncodeResult)?;
    Ok(Response::ok(request.header.id.clone(), result))
}

/// Walks the ordered handler list, treating `NoSuchMethod` as fallthrough
/// to the next candidate until the list is exhausted (spec §4.2, §8 item
/// nothing-hidden: "a result of `NoSuchMethod` falls through ... until
/// exhausted, at which point the last error surfaces").
pub async fn dispatch(handlers: &[Handler], request: Request) -> Response {
    let mut last_error: Option<(ErrorCode, String)> = None;

    for (index, handler) in handlers.iter().enumerate() {
        let is_last = index + 1 == handlers.len();

        match handler {
            Handler::Proxy(send) => match send(request.clone()).await {
                Ok(mut response) => {
                    if !is_no_such_method(&response) || is_last {
                        response.header.id = request.header.id.clone();
                        return response;
                    }
                    if let Some(err) = response.header.error {
                        last_error = Some((err.code, err.message));
                    }
                }
                Err(err) => {
                    return error_response(&request, ErrorCode::ProxyFailed, err.to_string());
                }
            },
            Handler::Local(resource) => match call_local(resource.as_ref(), &request).await {
                Ok(response) => return response,
                Err(DispatchError::NoSuchMethod(message)) if !is_last => {
                    last_error = Some((ErrorCode::NoSuchMethod, message));
                }
                Err(err) => {
                    return error_response(&request, err.code(), err.to_string());
                }
            },
        }
    }

    let (code, message) = last_error.unwrap_or_else(|| {
        (
            ErrorCode::NoSuchMethod,
            format!("no method {:?} found", request.method),
        )
    });
    error_response(&request, code, message)
}
