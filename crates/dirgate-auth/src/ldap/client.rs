//! LDAP client implementation
//!
//! Handles LDAP connections, binds, and streaming searches.
//! Supports LDAP, LDAPS (SSL), and STARTTLS connections.

use crate::directory::{DirectoryConnection, DirectoryConnector, EntryStream};
use crate::error::{DirectoryError, DirectoryResult, RC_INVALID_CREDENTIALS};
use async_trait::async_trait;
use dirgate_core::config::DirectoryConfig;
use dirgate_core::types::{DirectoryEntry, SearchScope};
use ldap3::exop::WhoAmI;
use ldap3::result::ExopResult;
use ldap3::{
    Ldap, LdapConnAsync, LdapConnSettings, LdapError, ResultEntry, Scope, SearchEntry, SearchStream,
};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, warn};

/// Transport settings for LDAP connections
#[derive(Debug, Clone)]
pub struct LdapConnectorSettings {
    /// Connect with `ldaps://`
    pub use_tls: bool,
    /// Upgrade the connection with STARTTLS
    pub start_tls: bool,
    /// Skip TLS certificate verification
    pub skip_tls_verify: bool,
    /// Connection timeout, also applied to every operation
    pub timeout: Duration,
}

impl Default for LdapConnectorSettings {
    fn default() -> Self {
        Self {
            use_tls: false,
            start_tls: false,
            skip_tls_verify: false,
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&DirectoryConfig> for LdapConnectorSettings {
    fn from(config: &DirectoryConfig) -> Self {
        Self {
            use_tls: config.use_tls,
            start_tls: config.start_tls,
            skip_tls_verify: config.skip_tls_verify,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

/// Opens a fresh LDAP connection per call; nothing is pooled
#[derive(Debug, Clone, Default)]
pub struct LdapConnector {
    settings: LdapConnectorSettings,
}

impl LdapConnector {
    pub fn new(settings: LdapConnectorSettings) -> Self {
        Self { settings }
    }

    pub fn server_url(&self, host: &str, port: u16) -> String {
        let scheme = if self.settings.use_tls { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, host, port)
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    async fn connect(&self, host: &str, port: u16) -> DirectoryResult<Box<dyn DirectoryConnection>> {
        let url = self.server_url(host, port);
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.settings.timeout)
            .set_starttls(self.settings.start_tls)
            .set_no_tls_verify(self.settings.skip_tls_verify);

        debug!("Connecting to LDAP server: {}", url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| DirectoryError::Connect(format!("{}: {}", url, e)))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection error: {}", e);
            }
        });

        Ok(Box::new(LdapConnection {
            ldap,
            timeout: self.settings.timeout,
        }))
    }
}

/// One LDAP session
pub struct LdapConnection {
    ldap: Ldap,
    timeout: Duration,
}

impl LdapConnection {
    /// Ask the server who the connection is bound as.
    ///
    /// An empty authorization id means the bind was anonymous or
    /// unauthenticated (e.g. a simple bind with an empty password).
    async fn is_bound(&mut self, secret: &SecretString) -> DirectoryResult<bool> {
        let ExopResult(exop, result) = self
            .ldap
            .with_timeout(self.timeout)
            .extended(WhoAmI)
            .await
            .map_err(map_ldap_error)?;

        if result.rc != 0 {
            debug!(
                "Who am I? unavailable (rc={}), falling back to secret presence",
                result.rc
            );
        }
        Ok(is_authenticated(
            result.rc,
            exop.val.as_deref(),
            !secret.expose_secret().is_empty(),
        ))
    }
}

#[async_trait]
impl DirectoryConnection for LdapConnection {
    async fn bind_as(&mut self, dn: &str, secret: &SecretString) -> DirectoryResult<bool> {
        let result = self
            .ldap
            .with_timeout(self.timeout)
            .simple_bind(dn, secret.expose_secret())
            .await
            .map_err(map_ldap_error)?;

        check_rc(result.rc, result.text)?;

        debug!("Bind completed for: {}", dn);
        self.is_bound(secret).await
    }

    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Box<dyn EntryStream>> {
        debug!("Searching {} with filter: {}", base, filter);

        let stream = self
            .ldap
            .with_timeout(self.timeout)
            .streaming_search(base, to_ldap_scope(scope), filter, attributes.to_vec())
            .await
            .map_err(map_ldap_error)?;

        Ok(Box::new(LdapEntryStream {
            stream,
            finished: false,
        }))
    }

    async fn disconnect(&mut self) -> DirectoryResult<()> {
        self.ldap.unbind().await.map_err(map_ldap_error)
    }
}

struct LdapEntryStream {
    stream: SearchStream<'static, String, Vec<String>>,
    finished: bool,
}

#[async_trait]
impl EntryStream for LdapEntryStream {
    async fn next_entry(&mut self) -> DirectoryResult<Option<DirectoryEntry>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.stream.next().await.map_err(map_ldap_error)? {
                Some(result) => {
                    if !is_search_entry(&result) {
                        continue;
                    }
                    let entry = SearchEntry::construct(result);
                    return Ok(Some(DirectoryEntry::from_multi_valued(entry.dn, entry.attrs)));
                }
                None => {
                    self.finished = true;
                    let result = self.stream.finish().await;
                    return check_rc(result.rc, result.text).map(|()| None);
                }
            }
        }
    }
}

/// Referrals and intermediate messages carry no entry
fn is_search_entry(result: &ResultEntry) -> bool {
    !result.is_ref() && !result.is_intermediate()
}

/// Map an LDAP result code: 0 is success, 49 a rejected secret
fn check_rc(rc: u32, text: String) -> DirectoryResult<()> {
    match rc {
        0 => Ok(()),
        RC_INVALID_CREDENTIALS => Err(DirectoryError::InvalidCredentials),
        rc => Err(DirectoryError::Protocol { rc, message: text }),
    }
}

/// Post-condition of a successful bind.
///
/// With "Who am I?" answered (`rc == 0`), an empty or absent authorization id
/// means the bind was anonymous or unauthenticated. When the server rejects
/// the operation, only a non-empty secret counts as authenticated.
fn is_authenticated(rc: u32, authzid: Option<&[u8]>, has_secret: bool) -> bool {
    if rc != 0 {
        return has_secret;
    }
    authzid.map(|id| !id.is_empty()).unwrap_or(false)
}

fn to_ldap_scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::Base => Scope::Base,
        SearchScope::OneLevel => Scope::OneLevel,
        SearchScope::Subtree => Scope::Subtree,
    }
}

fn map_ldap_error(e: LdapError) -> DirectoryError {
    match e {
        LdapError::Timeout { .. } => DirectoryError::Timeout,
        LdapError::LdapResult { result } => match check_rc(result.rc, result.text) {
            Err(e) => e,
            Ok(()) => DirectoryError::Transport("operation failed with result code 0".to_string()),
        },
        other => DirectoryError::Transport(other.to_string()),
    }
}
