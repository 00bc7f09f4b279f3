//! Dirgate Core Library
//!
//! Core types, configuration, and error handling shared by the Dirgate
//! directory authentication crates.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::DirgateConfig;
pub use error::{Error, Result};

/// Dirgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Date format of the validity attributes stored in the directory (`yyyy/MM/dd`)
pub const VALIDITY_DATE_FORMAT: &str = "%Y/%m/%d";

/// Substituted for a missing or blank valid-until attribute
pub const VALIDITY_END_SENTINEL: &str = "2999/12/31";

/// Raw administrator-flag value that grants administrator rights
pub const ADMIN_FLAG_VALUE: &str = "1";

/// Default LDAP port
pub const DEFAULT_LDAP_PORT: u16 = 389;
