// Built-in providers: data-driven registry of provider profiles.
//
// Each provider is a `ProviderProfile` value; `AuthClient` implements the flow
// once for all of them.

pub mod registry;
pub use registry::*;
