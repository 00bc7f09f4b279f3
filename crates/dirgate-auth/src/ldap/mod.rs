//! LDAP directory client
//!
//! Implements the directory contract on top of `ldap3`:
//! - LDAP, LDAPS and STARTTLS connections
//! - Simple bind with a "Who am I?" post-condition check
//! - Streaming one-level searches

mod client;

pub use client::{LdapConnection, LdapConnector, LdapConnectorSettings};
