// Utility functions: URL composition and return-URL helpers.

pub mod url;

pub use url::{compose_url, return_url_from, FixedRoute, RouteResolver};
