#![doc = include_str!("../README.md")]

pub mod env;
pub mod error;
pub mod params;
pub mod state_store;
pub mod utils;

// Re-exports for convenience
pub use error::{AuthClientError, ErrorKind, HttpStatus, Result, UpstreamError};
pub use params::Params;
pub use state_store::{MemoryStateStore, StateStore, StateStoreError};
pub use utils::url::{compose_url, return_url_from, FixedRoute, RouteResolver};
