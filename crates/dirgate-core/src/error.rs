//! Error types for Dirgate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    // Validation Errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Database Errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unsupported database url: {0}")]
    UnsupportedDatabase(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::ConfigLoad(_) => "ConfigLoad",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::DatabaseError(_) => "DatabaseError",
            Error::UnsupportedDatabase(_) => "UnsupportedDatabase",
        }
    }
}
