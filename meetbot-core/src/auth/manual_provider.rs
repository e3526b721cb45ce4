// File: meetbot-core/src/auth/manual_provider.rs
//
// Identity provider for hosts without a token service: a token can be seeded
// up front, or the user pastes one in reply to the sign-in prompt.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;
use meetbot_common::models::AccessToken;
use crate::auth::IdentityProvider;
use crate::Error;

pub struct ManualTokenProvider {
    connection_name: String,
    sign_in_url: String,
    tokens: DashMap<String, AccessToken>,
}

impl ManualTokenProvider {
    pub fn new(connection_name: impl Into<String>, sign_in_url: impl Into<String>) -> Self {
        Self {
            connection_name: connection_name.into(),
            sign_in_url: sign_in_url.into(),
            tokens: DashMap::new(),
        }
    }

    /// Pre-authorizes `user_id`.
    pub fn with_token(self, user_id: impl Into<String>, token: impl Into<String>) -> Self {
        let token = AccessToken::new(token).with_connection(self.connection_name.clone());
        self.tokens.insert(user_id.into(), token);
        self
    }
}

#[async_trait]
impl IdentityProvider for ManualTokenProvider {
    async fn get_user_token(
        &self,
        user_id: &str,
        magic_code: Option<&str>,
    ) -> Result<Option<AccessToken>, Error> {
        if let Some(code) = magic_code.map(str::trim).filter(|c| !c.is_empty()) {
            info!("Storing pasted token for user '{}'", user_id);
            let token = AccessToken::new(code).with_connection(self.connection_name.clone());
            self.tokens.insert(user_id.to_string(), token);
        }
        Ok(self.tokens.get(user_id).map(|t| t.value().clone()))
    }

    async fn sign_in_link(&self, _user_id: &str) -> Result<String, Error> {
        Ok(self.sign_in_url.clone())
    }

    async fn sign_out(&self, user_id: &str) -> Result<(), Error> {
        self.tokens.remove(user_id);
        Ok(())
    }
}
