//! Directory authentication orchestrator
//!
//! One attempt runs these steps in order, without retries:
//!
//! 1. connect to the directory
//! 2. bind as the service account
//! 3. search one level below the base for the claimed identifier
//! 4. keep the entries inside their validity window
//! 5. require exactly one of them and bind as it with the user's secret
//! 6. confirm the user has local profile rows
//!
//! The connection is released exactly once after a successful connect,
//! whatever happens in steps 2 to 6.

use chrono::{Local, NaiveDate};
use dirgate_core::config::{DirectoryConfig, EntryAttributes};
use dirgate_core::types::{Credential, DirectoryEntry, Identity, SearchScope};
use dirgate_core::utils::{generate_attempt_id, is_blank};
use dirgate_core::ADMIN_FLAG_VALUE;
use dirgate_metadata::UserRecordStore;
use futures::FutureExt;
use secrecy::SecretString;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::directory::{build_search_filter, DirectoryConnection, DirectoryConnector};
use crate::error::{AuthFailure, AuthResult, DirectoryError};
use crate::resolver;
use crate::validity;

/// Immutable settings of the authenticator
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub host: String,
    pub port: u16,
    /// User entries live one level below this DN
    pub search_base: String,
    pub manager_dn: String,
    pub manager_secret: SecretString,
    /// Attribute compared with the claimed identifier
    pub search_attribute: String,
    pub attributes: EntryAttributes,
}

impl AuthSettings {
    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            search_base: config.search_base.clone(),
            manager_dn: config.manager_dn.clone(),
            manager_secret: SecretString::from(config.manager_password.clone()),
            search_attribute: config.search_attribute.clone(),
            attributes: config.attributes.clone(),
        }
    }
}

/// Authenticates identifiers against the directory and the local user records.
///
/// Holds no per-attempt state; share it behind an `Arc` and call it
/// concurrently. Every attempt opens its own directory connection.
pub struct Authenticator {
    connector: Arc<dyn DirectoryConnector>,
    store: Arc<dyn UserRecordStore>,
    settings: AuthSettings,
}

impl Authenticator {
    pub fn new(
        connector: Arc<dyn DirectoryConnector>,
        store: Arc<dyn UserRecordStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            connector,
            store,
            settings,
        }
    }

    /// Authenticate using today's local date for validity checks
    pub async fn authenticate(&self, identifier: &str, secret: SecretString) -> AuthResult<Identity> {
        let credential = Credential::new(identifier, secret);
        self.authenticate_on(&credential, Local::now().date_naive()).await
    }

    /// Authenticate with an explicit date for validity checks
    pub async fn authenticate_on(
        &self,
        credential: &Credential,
        today: NaiveDate,
    ) -> AuthResult<Identity> {
        let span = info_span!(
            "authenticate",
            attempt_id = %generate_attempt_id(),
            identifier = %credential.identifier(),
        );

        async move {
            info!("Directory authentication started");

            let outcome = self.run(credential, today).await;
            match &outcome {
                Ok(identity) => info!(
                    local_user_id = %identity.local_user_id(),
                    is_administrator = identity.is_administrator(),
                    "Directory authentication succeeded"
                ),
                Err(failure) if failure.is_system_fault() => error!(
                    code = failure.code(),
                    "Directory authentication failed: {}",
                    failure
                ),
                Err(failure) => warn!(
                    code = failure.code(),
                    "Directory authentication failed: {}",
                    failure
                ),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, credential: &Credential, today: NaiveDate) -> AuthResult<Identity> {
        let mut conn = self
            .connector
            .connect(&self.settings.host, self.settings.port)
            .await
            .map_err(AuthFailure::DirectoryUnreachable)?;

        debug!(
            "Connected to directory {}:{}",
            self.settings.host, self.settings.port
        );

        let outcome = AssertUnwindSafe(self.run_session(conn.as_mut(), credential, today))
            .catch_unwind()
            .await;

        match conn.disconnect().await {
            Ok(()) => debug!("Disconnected from directory"),
            Err(e) => warn!("Directory disconnect failed: {}", e),
        }

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn run_session(
        &self,
        conn: &mut dyn DirectoryConnection,
        credential: &Credential,
        today: NaiveDate,
    ) -> AuthResult<Identity> {
        self.bind_manager(conn).await?;

        let entries = self.search_entries(conn, credential.identifier()).await?;

        let candidates = validity::filter_current(entries, today, &self.settings.attributes)?;
        debug!("Current entries: {}", candidates.len());

        let (dn, entry) = resolver::resolve(candidates)?;

        self.bind_user(conn, &dn, credential).await?;

        self.reconcile(credential.identifier(), &entry).await
    }

    async fn bind_manager(&self, conn: &mut dyn DirectoryConnection) -> AuthResult<()> {
        match conn
            .bind_as(&self.settings.manager_dn, &self.settings.manager_secret)
            .await
        {
            Ok(true) => {
                debug!("Service account bind succeeded");
                Ok(())
            }
            Ok(false) => Err(AuthFailure::ManagerNotBound),
            Err(DirectoryError::InvalidCredentials) => Err(AuthFailure::ManagerCredentialsInvalid),
            Err(e) => Err(AuthFailure::Directory(e)),
        }
    }

    /// Drain the whole search before anything looks at the entry count
    async fn search_entries(
        &self,
        conn: &mut dyn DirectoryConnection,
        identifier: &str,
    ) -> AuthResult<Vec<DirectoryEntry>> {
        let filter = build_search_filter(&self.settings.search_attribute, identifier);
        let attributes = self.settings.attributes.requested();

        let mut stream = conn
            .search(
                &self.settings.search_base,
                SearchScope::OneLevel,
                &filter,
                &attributes,
            )
            .await
            .map_err(AuthFailure::Directory)?;

        let first = match stream.next_entry().await.map_err(AuthFailure::Directory)? {
            Some(entry) => entry,
            None => return Err(AuthFailure::NoDirectoryEntry),
        };

        let mut entries = vec![first];
        while let Some(entry) = stream.next_entry().await.map_err(AuthFailure::Directory)? {
            entries.push(entry);
        }

        debug!("Search returned {} entries", entries.len());
        Ok(entries)
    }

    async fn bind_user(
        &self,
        conn: &mut dyn DirectoryConnection,
        dn: &str,
        credential: &Credential,
    ) -> AuthResult<()> {
        match conn.bind_as(dn, credential.secret()).await {
            Ok(true) => {
                debug!("User bind succeeded: {}", dn);
                Ok(())
            }
            Ok(false) | Err(DirectoryError::InvalidCredentials) => {
                debug!("User bind rejected: {}", dn);
                Err(AuthFailure::UserCredentialsInvalid)
            }
            Err(e) => Err(AuthFailure::Directory(e)),
        }
    }

    async fn reconcile(&self, identifier: &str, entry: &DirectoryEntry) -> AuthResult<Identity> {
        let attributes = &self.settings.attributes;
        let is_administrator = entry.attribute(&attributes.admin_flag) == Some(ADMIN_FLAG_VALUE);

        let local_user_id = entry.attribute(&attributes.local_user_id);
        let local_user_id = match local_user_id {
            Some(id) if !is_blank(Some(id)) => id,
            _ => {
                warn!("Entry {} has no {} value", entry.dn, attributes.local_user_id);
                return Err(AuthFailure::NoLocalRecord {
                    user_id: String::new(),
                });
            }
        };

        let rows = self
            .store
            .find_by_user_id(local_user_id)
            .await
            .map_err(AuthFailure::RecordStore)?;

        if rows.is_empty() {
            return Err(AuthFailure::NoLocalRecord {
                user_id: local_user_id.to_string(),
            });
        }

        debug!("Local profile rows for {}: {}", local_user_id, rows.len());
        Ok(Identity::new(identifier, local_user_id, is_administrator))
    }
}
