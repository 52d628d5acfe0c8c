#![doc = include_str!("../README.md")]

pub mod attributes;
pub mod client;
pub mod collection;
pub mod options;
pub mod profile;
pub mod providers;
pub mod response;
pub mod state;
pub mod token;
pub mod transport;

// Re-exports
pub use attributes::{normalize_attributes, UserAttributes, ID_ATTRIBUTE};
pub use client::{AuthClient, Authenticated, FlowSession, FlowStage};
pub use collection::{ClientCollection, ClientConfig};
pub use options::{ClientOptions, DEFAULT_STATE_TTL_SECS};
pub use profile::{
    ApiAuth, ApiCall, AuthenticationMethod, ParamNames, ProviderProfile, UserInfoStrategy,
    ViewOptions,
};
pub use providers::{get_provider_profile, PROVIDER_IDS, QQ, WECHAT, WEIBO};
pub use response::{ContentType, ResponseNormalizer, ResponseQuirk};
pub use state::{consume_auth_state, generate_auth_state, state_storage_key, store_auth_state};
pub use token::Token;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
