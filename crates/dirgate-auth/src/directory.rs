//! Directory client contract
//!
//! The authenticator talks to the directory through these traits only. A
//! connection is acquired per attempt with [`DirectoryConnector::connect`] and
//! must be released with [`DirectoryConnection::disconnect`] exactly once.

use async_trait::async_trait;
use dirgate_core::types::{DirectoryEntry, SearchScope};
use secrecy::SecretString;

use crate::error::DirectoryResult;

/// Opens directory connections
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> DirectoryResult<Box<dyn DirectoryConnection>>;
}

/// One open directory session
#[async_trait]
pub trait DirectoryConnection: Send {
    /// Bind the connection as `dn`.
    ///
    /// Returns whether the connection is authenticated afterwards. A bind that
    /// completes without error can still leave the connection unauthenticated,
    /// so callers must check the returned flag. A rejected secret is reported
    /// as [`DirectoryError::InvalidCredentials`](crate::DirectoryError::InvalidCredentials).
    async fn bind_as(&mut self, dn: &str, secret: &SecretString) -> DirectoryResult<bool>;

    /// Start a search. Entries arrive lazily through the returned stream.
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Box<dyn EntryStream>>;

    async fn disconnect(&mut self) -> DirectoryResult<()>;
}

/// Single-pass stream of search results.
///
/// The number of entries is only known once `next_entry` has returned `None`.
#[async_trait]
pub trait EntryStream: Send {
    async fn next_entry(&mut self) -> DirectoryResult<Option<DirectoryEntry>>;
}

/// Equality filter `(attribute=value)` with the value escaped per RFC 4515
pub fn build_search_filter(attribute: &str, value: &str) -> String {
    format!("({}={})", attribute, ldap3::ldap_escape(value))
}
