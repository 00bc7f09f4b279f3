//! Authentication error types

use thiserror::Error;

/// Result type for directory client operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Result type for authentication attempts
pub type AuthResult<T> = Result<T, AuthFailure>;

/// Message key shown for a rejected user password
pub const INVALID_CREDENTIALS_MESSAGE_KEY: &str = "auth.error.invalid_credentials";

/// Message key shown for every other failure
pub const GENERIC_FAILURE_MESSAGE_KEY: &str = "auth.error.generic";

/// LDAP result code for invalidCredentials
pub const RC_INVALID_CREDENTIALS: u32 = 49;

/// Errors raised by a directory client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Failed to connect to directory server: {0}")]
    Connect(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Directory operation failed with result code {rc}: {message}")]
    Protocol { rc: u32, message: String },

    #[error("Directory operation timed out")]
    Timeout,

    #[error("Directory transport error: {0}")]
    Transport(String),
}

/// Malformed directory data found while checking validity windows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidityError {
    #[error("Entry {dn} has no {attribute} value")]
    MissingStartDate { dn: String, attribute: String },

    #[error("Entry {dn} has an unparsable {attribute} value {value:?}")]
    InvalidDate {
        dn: String,
        attribute: String,
        value: String,
    },

    #[error("Entry {0} was returned more than once")]
    DuplicateDn(String),
}

/// Why an authentication attempt failed
#[derive(Error, Debug)]
pub enum AuthFailure {
    #[error("Directory server is unreachable: {0}")]
    DirectoryUnreachable(#[source] DirectoryError),

    #[error("Service account credentials were rejected by the directory")]
    ManagerCredentialsInvalid,

    #[error("Service account bind did not authenticate the connection")]
    ManagerNotBound,

    #[error("No directory entry matches the identifier")]
    NoDirectoryEntry,

    #[error("No matching directory entry is inside its validity window")]
    NoValidEntry,

    #[error("{count} matching directory entries are valid at the same time")]
    TooManyValidEntries { count: usize },

    #[error("User credentials were rejected by the directory")]
    UserCredentialsInvalid,

    #[error("No local user record for user id {user_id:?}")]
    NoLocalRecord { user_id: String },

    #[error("Invalid directory data: {0}")]
    InternalDataError(#[from] ValidityError),

    #[error("Directory error: {0}")]
    Directory(#[source] DirectoryError),

    #[error("User record store error: {0}")]
    RecordStore(#[source] dirgate_core::Error),
}

impl AuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::DirectoryUnreachable(_) => "DirectoryUnreachable",
            AuthFailure::ManagerCredentialsInvalid => "ManagerCredentialsInvalid",
            AuthFailure::ManagerNotBound => "ManagerNotBound",
            AuthFailure::NoDirectoryEntry => "NoDirectoryEntry",
            AuthFailure::NoValidEntry => "NoValidEntry",
            AuthFailure::TooManyValidEntries { .. } => "TooManyValidEntries",
            AuthFailure::UserCredentialsInvalid => "UserCredentialsInvalid",
            AuthFailure::NoLocalRecord { .. } => "NoLocalRecord",
            AuthFailure::InternalDataError(_) => "InternalDataError",
            AuthFailure::Directory(_) => "DirectoryError",
            AuthFailure::RecordStore(_) => "RecordStoreError",
        }
    }

    /// Message key identifying the exact reason, for operators
    pub fn message_key(&self) -> &'static str {
        match self {
            AuthFailure::DirectoryUnreachable(_) => "auth.error.directory_unreachable",
            AuthFailure::ManagerCredentialsInvalid => "auth.error.manager_credentials_invalid",
            AuthFailure::ManagerNotBound => "auth.error.manager_not_bound",
            AuthFailure::NoDirectoryEntry => "auth.error.no_directory_entry",
            AuthFailure::NoValidEntry => "auth.error.no_valid_entry",
            AuthFailure::TooManyValidEntries { .. } => "auth.error.too_many_valid_entries",
            AuthFailure::UserCredentialsInvalid => INVALID_CREDENTIALS_MESSAGE_KEY,
            AuthFailure::NoLocalRecord { .. } => "auth.error.no_local_record",
            AuthFailure::InternalDataError(_) => "auth.error.internal_data",
            AuthFailure::Directory(_) => "auth.error.directory",
            AuthFailure::RecordStore(_) => "auth.error.record_store",
        }
    }

    /// Only a rejected user password may be reported to the end user as such
    pub fn is_user_facing_credential_failure(&self) -> bool {
        matches!(self, AuthFailure::UserCredentialsInvalid)
    }

    /// Message key safe to show to the end user
    pub fn user_message_key(&self) -> &'static str {
        if self.is_user_facing_credential_failure() {
            INVALID_CREDENTIALS_MESSAGE_KEY
        } else {
            GENERIC_FAILURE_MESSAGE_KEY
        }
    }

    /// Default English text for [`user_message_key`](Self::user_message_key)
    pub fn user_message(&self) -> &'static str {
        if self.is_user_facing_credential_failure() {
            "The identifier or password is incorrect."
        } else {
            "Authentication failed. Please contact your system administrator."
        }
    }

    /// Failures caused by deployment or directory data problems rather than the user
    pub fn is_system_fault(&self) -> bool {
        matches!(
            self,
            AuthFailure::DirectoryUnreachable(_)
                | AuthFailure::ManagerCredentialsInvalid
                | AuthFailure::ManagerNotBound
                | AuthFailure::TooManyValidEntries { .. }
                | AuthFailure::InternalDataError(_)
                | AuthFailure::Directory(_)
                | AuthFailure::RecordStore(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_failures() -> Vec<AuthFailure> {
        vec![
            AuthFailure::DirectoryUnreachable(DirectoryError::Connect("refused".into())),
            AuthFailure::ManagerCredentialsInvalid,
            AuthFailure::ManagerNotBound,
            AuthFailure::NoDirectoryEntry,
            AuthFailure::NoValidEntry,
            AuthFailure::TooManyValidEntries { count: 2 },
            AuthFailure::UserCredentialsInvalid,
            AuthFailure::NoLocalRecord {
                user_id: "U1".into(),
            },
            AuthFailure::InternalDataError(ValidityError::DuplicateDn("uid=a".into())),
            AuthFailure::Directory(DirectoryError::Timeout),
            AuthFailure::RecordStore(dirgate_core::Error::DatabaseError("locked".into())),
        ]
    }

    #[test]
    fn test_codes_are_distinct() {
        let failures = all_failures();
        let mut codes: Vec<_> = failures.iter().map(|f| f.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), failures.len());

        let mut keys: Vec<_> = failures.iter().map(|f| f.message_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), failures.len());
    }

    #[test]
    fn test_only_user_credentials_are_user_facing() {
        for failure in all_failures() {
            if matches!(failure, AuthFailure::UserCredentialsInvalid) {
                assert_eq!(failure.user_message_key(), INVALID_CREDENTIALS_MESSAGE_KEY);
                assert!(!failure.is_system_fault());
            } else {
                assert_eq!(failure.user_message_key(), GENERIC_FAILURE_MESSAGE_KEY);
                assert!(!failure.user_message().contains("password"));
            }
        }
    }

    #[test]
    fn test_manager_failures_are_system_faults() {
        assert!(AuthFailure::ManagerCredentialsInvalid.is_system_fault());
        assert!(AuthFailure::ManagerNotBound.is_system_fault());
        assert!(!AuthFailure::NoDirectoryEntry.is_system_fault());
    }
}
