//! Credential and identity types

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A claimed identifier and its secret, alive for one authentication call
#[derive(Debug)]
pub struct Credential {
    identifier: String,
    secret: SecretString,
}

impl Credential {
    pub fn new(identifier: impl Into<String>, secret: SecretString) -> Self {
        Self {
            identifier: identifier.into(),
            secret,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}

/// The authenticated identity handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    claimed_identifier: String,
    local_user_id: String,
    is_administrator: bool,
}

impl Identity {
    pub fn new(
        claimed_identifier: impl Into<String>,
        local_user_id: impl Into<String>,
        is_administrator: bool,
    ) -> Self {
        Self {
            claimed_identifier: claimed_identifier.into(),
            local_user_id: local_user_id.into(),
            is_administrator,
        }
    }

    /// The identifier the user typed in
    pub fn claimed_identifier(&self) -> &str {
        &self.claimed_identifier
    }

    /// The directory's local user id, also the key of the local profile rows
    pub fn local_user_id(&self) -> &str {
        &self.local_user_id
    }

    pub fn is_administrator(&self) -> bool {
        self.is_administrator
    }
}
