use std::fmt;
use serde::{Deserialize, Serialize};

/// Opaque bearer credential handed out by the identity provider.
///
/// The bot never keeps one of these beyond the call that asked for it; every
/// turn that needs the directory asks the provider again.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    token: String,
    pub connection_name: Option<String>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            connection_name: None,
        }
    }

    pub fn with_connection(mut self, connection_name: impl Into<String>) -> Self {
        self.connection_name = Some(connection_name.into());
        self
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    /// A token with only whitespace cannot authorize anything.
    pub fn is_usable(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("connection_name", &self.connection_name)
            .finish()
    }
}

/// Result of one trip through the credential gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    Authenticated(AccessToken),
    Unauthenticated,
}

impl TokenOutcome {
    pub fn into_token(self) -> Option<AccessToken> {
        match self {
            TokenOutcome::Authenticated(t) => Some(t),
            TokenOutcome::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, TokenOutcome::Authenticated(_))
    }
}
