//! Authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Authentication configuration (JWT session validation)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Signing secret shared with the credential issuer
    pub jwt_secret: Secret<String>,

    /// Expected token issuer
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Expected token audience
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.expose_secret().len() < 32 {
            return Err(ValidationError::JwtSecretTooShort);
        }
        if self.issuer.is_empty() {
            return Err(ValidationError::MissingRequired("auth.issuer"));
        }
        Ok(())
    }

    /// A config with a fixed secret, for unit tests only.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: Secret::new("test-secret-test-secret-test-secret!".to_string()),
            issuer: default_issuer(),
            audience: default_audience(),
        }
    }
}

fn default_issuer() -> String {
    "rollcall-auth".to_string()
}

fn default_audience() -> String {
    "rollcall".to_string()
}
