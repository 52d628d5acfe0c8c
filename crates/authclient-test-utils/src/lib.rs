// Test support for authclient flows.
//
// - `MockTransport` answers requests from a scripted queue and records what
//   the client sent
// - `fixtures` holds provider payloads in the shapes the real endpoints return

pub mod fixtures;
pub mod mock_transport;

pub use mock_transport::{MockTransport, ScriptedResponse};
