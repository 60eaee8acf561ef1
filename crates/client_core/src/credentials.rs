//! Session credential sources attached to outbound requests.

use anyhow::Result;
use async_trait::async_trait;

/// Supplies the identity provider's current session token.
///
/// Implementations are injected into [`crate::ApplyClient`]; `Ok(None)` means
/// there is no active session and requests go out without credentials.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>>;
}

/// A token issued out of band (config file, environment, `--token`).
pub struct StaticTokenSource {
    token: Option<String>,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        Self {
            token: (!token.is_empty()).then(|| token.to_string()),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

pub struct MissingTokenSource;

#[async_trait]
impl TokenSource for MissingTokenSource {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
