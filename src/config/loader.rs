//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::credential::Credential;
use crate::config::env::ReadEnv;
use crate::config::schema::{ForwarderConfig, TrustMode};
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_API_TOKEN: &str = "API_TOKEN";
pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_BIND: &str = "FORWARDER_BIND";
pub const ENV_TRUST_MODE: &str = "FORWARDER_TRUST_MODE";
pub const ENV_DISCLOSURE_KEY: &str = "FORWARDER_DISCLOSURE_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then
/// environment overrides. The result is validated before it is returned.
pub fn load_config<E: ReadEnv>(path: Option<&Path>, env: &E) -> Result<ForwarderConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ForwarderConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides<E: ReadEnv>(config: &mut ForwarderConfig, env: &E) -> Result<(), ConfigError> {
    if let Some(token) = non_empty(env, ENV_API_TOKEN) {
        config.upstream.credential = Credential::new(token);
    }
    if let Some(base_url) = non_empty(env, ENV_BASE_URL) {
        config.upstream.base_url = base_url;
    }
    if let Some(bind) = non_empty(env, ENV_BIND) {
        config.listener.bind_address = bind;
    }
    if let Some(mode) = non_empty(env, ENV_TRUST_MODE) {
        config.trust_mode = mode
            .parse::<TrustMode>()
            .map_err(|reason| ConfigError::Env { key: ENV_TRUST_MODE, reason })?;
    }
    if let Some(key) = non_empty(env, ENV_DISCLOSURE_KEY) {
        config.disclosure.access_key = Credential::new(key);
    }
    Ok(())
}

fn non_empty<E: ReadEnv>(env: &E, key: &str) -> Option<String> {
    env.var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::InMemoryEnv;
    use std::io::Write;

    fn required_env() -> InMemoryEnv {
        InMemoryEnv::new()
            .with(ENV_API_TOKEN, "secret-token")
            .with(ENV_BASE_URL, "https://api.example.com/v5")
    }

    #[test]
    fn test_env_only_config() {
        let config = load_config(None, &required_env()).unwrap();
        assert_eq!(config.upstream.credential.expose(), "secret-token");
        assert_eq!(config.upstream.base_url, "https://api.example.com/v5");
    }

    #[test]
    fn test_missing_required_settings_fail_at_load() {
        let err = load_config(None, &InMemoryEnv::new()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::MissingCredential));
                assert!(errors.contains(&ValidationError::MissingBaseUrl));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_env_overrides_file() {
        let path = std::env::temp_dir().join(format!("forwarder-{}.toml", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            base_url = "https://file.example.com/v1"
            credential = "from-file"
            timeout_secs = 10
            "#
        )
        .unwrap();

        let env = InMemoryEnv::new().with(ENV_API_TOKEN, "from-env");
        let config = load_config(Some(&path), &env).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.upstream.credential.expose(), "from-env");
        assert_eq!(config.upstream.base_url, "https://file.example.com/v1");
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_trust_mode_env() {
        let env = required_env().with(ENV_TRUST_MODE, "sometimes");
        let err = load_config(None, &env).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: ENV_TRUST_MODE, .. }));
    }

    #[test]
    fn test_validation_error_never_prints_credential() {
        let env = InMemoryEnv::new().with(ENV_API_TOKEN, "secret-token");
        let err = load_config(None, &env).unwrap_err();
        assert!(!err.to_string().contains("secret-token"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/forwarder.toml")), &required_env()).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
