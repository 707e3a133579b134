//! Identity cache adapters.

mod file_store;
mod memory_store;

pub use file_store::FileIdentityStore;
pub use memory_store::InMemoryIdentityStore;
