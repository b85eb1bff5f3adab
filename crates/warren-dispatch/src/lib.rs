//! Reflection-free dispatch: a per-resource [`MethodTable`] built at
//! construction time, and an ordered [`Handler`] chain that walks
//! proxy-then-local (or local-then-local) candidates until one claims the
//! method.

mod error;
mod handler;
mod params;
mod table;

pub use error::DispatchError;
pub use handler::{dispatch, Dispatchable, Handler, ProxySender};
pub use params::{decode0, decode1, decode2, decode3, decode4, encode_fallible, encode_value, split_parameters};
pub use table::{Context, MethodTable, MethodTableBuilder};
