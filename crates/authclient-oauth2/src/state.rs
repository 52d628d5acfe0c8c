// CSRF state for the authorization redirect round trip.
//
// A state value is generated when the authorization URL is built, stored in
// the session's StateStore, and consumed exactly once when the callback is
// validated.

use rand::RngCore;
use subtle::ConstantTimeEq;

use authclient_core::{AuthClientError, Result, StateStore};

/// Logical key of the auth state within a client's namespace.
pub const STATE_KEY: &str = "state";

/// Random bytes per state value (160 bits).
const STATE_BYTES: usize = 20;

/// Generate a fresh state value: 160 random bits as 40 lowercase hex chars.
pub fn generate_auth_state() -> String {
    let mut buf = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Store key for a client's state, e.g. `oauth2:qq:state`.
pub fn state_storage_key(client_name: &str) -> String {
    format!("oauth2:{client_name}:{STATE_KEY}")
}

/// Persist `state` for `client_name`, replacing any earlier value.
pub async fn store_auth_state(
    store: &dyn StateStore,
    client_name: &str,
    state: &str,
    ttl: Option<u64>,
) -> Result<()> {
    store
        .put(&state_storage_key(client_name), state, ttl)
        .await?;
    Ok(())
}

/// Validate the state echoed back by the provider and consume the stored one.
///
/// Fails with `InvalidAuthState` when either side is missing or empty, or
/// when they differ in any byte. Comparison and removal happen in one store
/// operation, so a state is accepted at most once even when callbacks race.
/// On failure the stored value is left in place.
pub async fn consume_auth_state(
    store: &dyn StateStore,
    client_name: &str,
    echoed: Option<&str>,
) -> Result<()> {
    let Some(echoed) = echoed.filter(|e| !e.is_empty()) else {
        return Err(AuthClientError::InvalidAuthState);
    };

    let key = state_storage_key(client_name);
    let consumed = store
        .remove_if(&key, &|stored: &str| {
            !stored.is_empty() && states_match(stored, echoed)
        })
        .await?;
    if !consumed {
        return Err(AuthClientError::InvalidAuthState);
    }
    Ok(())
}

/// Byte-exact, case-sensitive comparison in constant time for equal lengths.
fn states_match(stored: &str, echoed: &str) -> bool {
    stored.len() == echoed.len() && bool::from(stored.as_bytes().ct_eq(echoed.as_bytes()))
}
