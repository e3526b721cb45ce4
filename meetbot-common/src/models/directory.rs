// File: meetbot-common/src/models/directory.rs

use serde::{Deserialize, Serialize};

/// `GET /me` and `GET /me/manager`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
}

impl UserProfile {
    /// Address used as the organizer of events created on the user's behalf.
    pub fn primary_address(&self) -> Option<&str> {
        self.mail
            .as_deref()
            .or(self.user_principal_name.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("someone")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub address: Option<String>,
}

impl EmailAddress {
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: Some(address.into()),
        }
    }
}

/// One entry of the user's contact directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub display_name: String,
    pub email_addresses: Vec<EmailAddress>,
}

impl Contact {
    pub fn new(display_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email_addresses: vec![EmailAddress::from_address(address)],
        }
    }

    pub fn first_address(&self) -> Option<&str> {
        self.email_addresses
            .iter()
            .filter_map(|e| e.address.as_deref())
            .next()
    }
}

/// A room mailbox as returned by the `/users` listing filtered on `givenName`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub display_name: String,
    pub given_name: Option<String>,
    pub mail: Option<String>,
}

impl Room {
    pub fn is_named(&self, name: &str) -> bool {
        self.display_name == name || self.given_name.as_deref() == Some(name)
    }
}

/// Entry of `GET /me/findRooms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundRoom {
    pub name: String,
    pub address: Option<String>,
}
