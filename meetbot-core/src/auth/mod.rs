// =============================================================================
// meetbot-core/src/auth/mod.rs
//   Identity provider seam plus the credential gate that fronts it.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use tracing::{debug, warn};
use meetbot_common::models::{AccessToken, TokenOutcome};
use crate::Error;

pub mod manual_provider;

pub use manual_provider::ManualTokenProvider;

/// The external login flow. Given a user (and, on the second leg, whatever the
/// user typed back after signing in) it answers with a token or nothing.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_user_token(
        &self,
        user_id: &str,
        magic_code: Option<&str>,
    ) -> Result<Option<AccessToken>, Error>;

    /// Link shown to a user who has no token yet.
    async fn sign_in_link(&self, user_id: &str) -> Result<String, Error>;

    async fn sign_out(&self, user_id: &str) -> Result<(), Error>;
}

/// Wraps exactly one identity-provider call per request.
///
/// Nothing is cached here: every caller gets a fresh answer from the provider,
/// so a token that expired while the user was typing is never handed out.
#[derive(Clone)]
pub struct CredentialGate {
    provider: Arc<dyn IdentityProvider>,
    timeout: Duration,
}

impl CredentialGate {
    pub fn new(provider: Arc<dyn IdentityProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn request_token(
        &self,
        user_id: &str,
        magic_code: Option<&str>,
    ) -> Result<TokenOutcome, Error> {
        debug!("Requesting token for user '{}' (code supplied: {})", user_id, magic_code.is_some());
        let call = self.provider.get_user_token(user_id, magic_code);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Some(token))) if token.is_usable() => Ok(TokenOutcome::Authenticated(token)),
            Ok(Ok(_)) => Ok(TokenOutcome::Unauthenticated),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!("Identity provider did not answer within {:?} for '{}'", self.timeout, user_id);
                Ok(TokenOutcome::Unauthenticated)
            }
        }
    }

    pub async fn sign_in_link(&self, user_id: &str) -> Result<String, Error> {
        self.provider.sign_in_link(user_id).await
    }

    pub async fn sign_out(&self, user_id: &str) -> Result<(), Error> {
        self.provider.sign_out(user_id).await
    }
}
