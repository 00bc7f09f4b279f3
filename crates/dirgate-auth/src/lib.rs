//! Directory authentication for Dirgate
//!
//! Verifies a claimed identifier and secret against an LDAP directory and
//! confirms the user is provisioned in the local user record store.

pub mod directory;
pub mod error;
pub mod ldap;
pub mod orchestrator;
pub mod resolver;
pub mod validity;

#[cfg(test)]
mod testing;

pub use directory::{build_search_filter, DirectoryConnection, DirectoryConnector, EntryStream};
pub use error::{AuthFailure, AuthResult, DirectoryError, DirectoryResult, ValidityError};
pub use ldap::{LdapConnection, LdapConnector, LdapConnectorSettings};
pub use orchestrator::{AuthSettings, Authenticator};
pub use validity::{filter_current, CandidateSet, ValidityWindow};
