//! Bearer credential providers.
//!
//! The backend asks its provider for a token before every request. Token
//! storage, refresh and expiry live outside this crate.

use std::path::PathBuf;

/// Environment variable read by [`EnvToken`].
pub const TOKEN_ENV: &str = "CLICKPRINT_TOKEN";

/// Source of the current bearer token.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> anyhow::Result<String>;
}

/// A fixed token (tests, one-shot CLI invocations).
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

/// Token taken from `CLICKPRINT_TOKEN` at call time.
#[derive(Debug, Clone, Default)]
pub struct EnvToken;

impl CredentialProvider for EnvToken {
    fn bearer_token(&self) -> anyhow::Result<String> {
        match std::env::var(TOKEN_ENV) {
            Ok(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
            _ => anyhow::bail!("{} is not set", TOKEN_ENV),
        }
    }
}

/// Token read from a file on every call, so an external login step can rotate it.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for TokenFile {
    fn bearer_token(&self) -> anyhow::Result<String> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("read token file {}: {}", self.path.display(), e))?;
        let token = raw.trim();
        if token.is_empty() {
            anyhow::bail!("token file {} is empty", self.path.display());
        }
        Ok(token.to_string())
    }
}
