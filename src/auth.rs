//! Credential types and the Docker-secret-file-then-env-var loading convention.
//!
//! Secrets are read from `/run/secrets/<NAME>` first (trimmed, empty treated as
//! missing) and fall back to the environment variable of the same name.

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::path::Path;

/// Wrapper for an API key with secure handling.
///
/// Ensures the key is never accidentally logged or exposed in debug output.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Create from string (takes ownership, prevents logging).
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Load from the `MASSIVE_API_KEY` secret file or environment variable.
    pub fn from_env() -> Option<Self> {
        load_optional_secret("MASSIVE_API_KEY").map(ApiKey::new)
    }

    /// Check if the API key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Expose the key for use in requests (internal only).
    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Default for ApiKey {
    fn default() -> Self {
        Self::new("")
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Authentication mode for API requests against the REST surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Use `Authorization: Bearer <key>` header (recommended).
    #[default]
    HeaderBearer,

    /// Use `apiKey` query parameter.
    QueryParam,
}

/// Read a Docker secret file at `/run/secrets/<name>`, trimmed. Empty is `None`.
fn read_docker_secret(name: &str) -> Option<String> {
    let path = Path::new("/run/secrets").join(name);
    let contents = std::fs::read_to_string(path).ok()?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Load a secret by name: Docker secret file first, then environment variable.
pub fn load_optional_secret(name: &str) -> Option<String> {
    read_docker_secret(name).or_else(|| env::var(name).ok().filter(|v| !v.is_empty()))
}

/// Load a required secret, returning a configuration error message if absent.
pub fn load_required_secret(name: &str) -> Result<String, crate::error::EngineError> {
    load_optional_secret(name).ok_or_else(|| crate::error::EngineError::Configuration {
        message: format!("required credential {name} is not set"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_redacted() {
        let key = ApiKey::new("secret-key-12345");
        let debug_output = format!("{:?}", key);
        assert_eq!(debug_output, "ApiKey(***)");
        assert!(!debug_output.contains("secret"));
    }

    #[test]
    fn test_api_key_expose() {
        let key = ApiKey::new("my-secret-key");
        assert_eq!(key.expose(), "my-secret-key");
    }

    #[test]
    fn test_api_key_is_empty() {
        let empty_key = ApiKey::default();
        assert!(empty_key.is_empty());

        let valid_key = ApiKey::new("some-key");
        assert!(!valid_key.is_empty());
    }

    #[test]
    fn test_auth_mode_default() {
        let mode = AuthMode::default();
        assert_eq!(mode, AuthMode::HeaderBearer);
    }

    #[test]
    fn test_load_optional_secret_missing() {
        env::remove_var("MASSIVE_OPTPROB_TEST_SECRET_UNSET");
        assert_eq!(
            load_optional_secret("MASSIVE_OPTPROB_TEST_SECRET_UNSET"),
            None
        );
    }

    #[test]
    fn test_load_optional_secret_from_env() {
        env::set_var("MASSIVE_OPTPROB_TEST_SECRET_ENV", "value-from-env");
        assert_eq!(
            load_optional_secret("MASSIVE_OPTPROB_TEST_SECRET_ENV"),
            Some("value-from-env".to_string())
        );
        env::remove_var("MASSIVE_OPTPROB_TEST_SECRET_ENV");
    }

    #[test]
    fn test_load_required_secret_missing_errors() {
        env::remove_var("MASSIVE_OPTPROB_TEST_REQUIRED_UNSET");
        let result = load_required_secret("MASSIVE_OPTPROB_TEST_REQUIRED_UNSET");
        assert!(result.is_err());
    }
}
