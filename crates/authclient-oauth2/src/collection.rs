// Named set of configured clients, e.g. loaded from the host's config file.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use authclient_core::{AuthClientError, Result};

use crate::client::AuthClient;
use crate::options::ClientOptions;
use crate::providers::get_provider_profile;
use crate::transport::HttpTransport;

/// Configuration entry for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Provider id; defaults to the entry's key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(flatten)]
    pub options: ClientOptions,
}

/// Clients keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ClientCollection {
    clients: BTreeMap<String, AuthClient>,
}

impl ClientCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one client per entry. Each entry's key becomes the client name
    /// unless the options name it explicitly.
    pub fn from_configs(
        configs: HashMap<String, ClientConfig>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let mut collection = Self::new();
        for (key, config) in configs {
            let provider_id = config.provider.as_deref().unwrap_or(&key);
            let profile = get_provider_profile(provider_id).ok_or_else(|| {
                AuthClientError::Config(format!(
                    "client `{key}` refers to unknown provider `{provider_id}`"
                ))
            })?;

            let mut options = config.options;
            if options.name.is_none() {
                options.name = Some(key.clone());
            }
            collection.insert(AuthClient::new(profile, options, Arc::clone(&transport)));
        }
        Ok(collection)
    }

    /// Add a client under its name, replacing any client of the same name.
    pub fn insert(&mut self, client: AuthClient) -> Option<AuthClient> {
        self.clients.insert(client.name().to_string(), client)
    }

    pub fn get(&self, name: &str) -> Option<&AuthClient> {
        self.clients.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clients.contains_key(name)
    }

    /// Client names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
