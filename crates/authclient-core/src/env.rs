// Environment detection, env-var configuration lookup and tracing setup.

use std::sync::OnceLock;

use crate::error::{AuthClientError, Result};

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Whether `AUTHCLIENT_ENV` (or, failing that, `RUST_ENV`) names production.
/// Read once per process.
pub fn is_production() -> bool {
    *PRODUCTION.get_or_init(|| {
        ["AUTHCLIENT_ENV", "RUST_ENV"]
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .is_some_and(|mode| is_production_mode(&mode))
    })
}

fn is_production_mode(mode: &str) -> bool {
    matches!(mode.trim().to_ascii_lowercase().as_str(), "production" | "prod")
}

/// Name of the per-client variable, e.g. `env_key("wechat", "client_id")`
/// is `WECHAT_CLIENT_ID`.
pub fn env_key(prefix: &str, name: &str) -> String {
    format!("{prefix}_{name}")
        .replace(['-', '.'], "_")
        .to_uppercase()
}

/// Read an optional per-client variable. Empty values count as unset.
pub fn optional_var(prefix: &str, name: &str) -> Option<String> {
    std::env::var(env_key(prefix, name))
        .ok()
        .filter(|v| !v.is_empty())
}

/// Read a required per-client variable.
pub fn required_var(prefix: &str, name: &str) -> Result<String> {
    let key = env_key(prefix, name);
    optional_var(prefix, name)
        .ok_or_else(|| AuthClientError::Config(format!("environment variable {key} is not set")))
}

/// Initialize the `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `authclient` crates log at `info`
/// in production and `debug` elsewhere. Calling this twice is harmless.
pub fn init_logger() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production() {
            EnvFilter::new("authclient_core=info,authclient_oauth2=info")
        } else {
            EnvFilter::new("authclient_core=debug,authclient_oauth2=debug")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("wechat", "client_id"), "WECHAT_CLIENT_ID");
        assert_eq!(env_key("my-qq", "scope"), "MY_QQ_SCOPE");
    }

    #[test]
    fn test_required_var_missing() {
        let err = required_var("authclient_env_test_missing", "client_id").unwrap_err();
        assert!(err.to_string().contains("AUTHCLIENT_ENV_TEST_MISSING_CLIENT_ID"));
    }

    #[test]
    fn test_production_mode_names() {
        assert!(is_production_mode("production"));
        assert!(is_production_mode("PROD"));
        assert!(!is_production_mode("test"));
        assert!(!is_production_mode(""));
    }

    #[test]
    fn test_init_logger_twice() {
        init_logger();
        init_logger();
    }
}
