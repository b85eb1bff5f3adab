mod error;
mod filter;
mod memory;
mod resource;
mod store;

pub use error::StoreError;
pub use filter::Filter;
pub use memory::MemoryStore;
pub use resource::{move_to, remove, Resource};
pub use store::Store;
