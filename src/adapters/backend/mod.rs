//! Backend HTTP adapters.

mod status_client;

pub use status_client::BackendStatusClient;
