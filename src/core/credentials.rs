//! Bearer token supply.
//!
//! Token acquisition and refresh live outside this crate; a
//! [`CredentialProvider`] only hands over whatever token is current.

use crate::core::error::{MatchStreamError, Result};
use async_trait::async_trait;
use std::env;

/// Source of the bearer token sent with each stream request
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// `None` sends the request unauthenticated
    async fn bearer_token(&self) -> Result<Option<String>>;
}

/// No authentication
#[derive(Debug, Clone, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Fixed token
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// Token read from an environment variable on every request
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

#[async_trait]
impl CredentialProvider for EnvTokenProvider {
    async fn bearer_token(&self) -> Result<Option<String>> {
        match env::var(&self.var) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(MatchStreamError::CredentialError(format!(
                "{} is not valid UTF-8",
                self.var
            ))),
        }
    }
}

/// JWT expiry inspection
pub mod token {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::{DateTime, Utc};

    /// Tokens this close to expiry count as expired
    pub const EXPIRY_SKEW_SECS: i64 = 5;

    /// `exp` claim of a JWT, if it has a readable one
    pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        let exp = claims.get("exp")?;
        let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Missing or unreadable `exp` counts as expired
    pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
        match expires_at(token) {
            Some(exp) => exp.timestamp() - EXPIRY_SKEW_SECS <= now.timestamp(),
            None => true,
        }
    }

    pub fn is_expired(token: &str) -> bool {
        is_expired_at(token, Utc::now())
    }
}
