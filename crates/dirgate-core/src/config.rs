//! Configuration for Dirgate

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirgateConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DirgateConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::ConfigLoad(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::ConfigLoad(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `DIRGATE_*` environment variables onto this configuration
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("DIRGATE_LDAP_HOST") {
            self.directory.host = host;
        }
        if let Ok(port) = std::env::var("DIRGATE_LDAP_PORT") {
            if let Ok(p) = port.parse() {
                self.directory.port = p;
            }
        }
        if let Ok(base) = std::env::var("DIRGATE_SEARCH_BASE") {
            self.directory.search_base = base;
        }
        if let Ok(dn) = std::env::var("DIRGATE_MANAGER_DN") {
            self.directory.manager_dn = dn;
        }
        if let Ok(password) = std::env::var("DIRGATE_MANAGER_PASSWORD") {
            self.directory.manager_password = password;
        }
        if let Ok(attr) = std::env::var("DIRGATE_SEARCH_ATTRIBUTE") {
            self.directory.search_attribute = attr;
        }
        if std::env::var("DIRGATE_LDAP_TLS").map(|v| v == "true").unwrap_or(false) {
            self.directory.use_tls = true;
        }
        if let Ok(url) = std::env::var("DIRGATE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(level) = std::env::var("DIRGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DIRGATE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.directory.validate()?;
        self.database.validate()?;
        self.logging.validate()
    }
}

/// Directory (LDAP) connection and schema settings
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory server host name
    #[serde(default = "default_host")]
    pub host: String,

    /// Directory server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect with `ldaps://`
    #[serde(default)]
    pub use_tls: bool,

    /// Upgrade a plain connection with STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Base DN; user entries are searched one level below it
    /// Example: "ou=people,dc=example,dc=com"
    #[serde(default)]
    pub search_base: String,

    /// Service account DN used for the lookup bind
    #[serde(default)]
    pub manager_dn: String,

    /// Service account password
    #[serde(default, skip_serializing)]
    pub manager_password: String,

    /// Attribute matched against the claimed identifier
    #[serde(default = "default_search_attribute")]
    pub search_attribute: String,

    /// Names of the attributes read from the user entry
    #[serde(default)]
    pub attributes: EntryAttributes,

    /// Connection and per-operation timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    crate::DEFAULT_LDAP_PORT
}

fn default_search_attribute() -> String {
    "uid".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            use_tls: false,
            start_tls: false,
            skip_tls_verify: false,
            search_base: String::new(),
            manager_dn: String::new(),
            manager_password: String::new(),
            search_attribute: default_search_attribute(),
            attributes: EntryAttributes::default(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("start_tls", &self.start_tls)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("search_base", &self.search_base)
            .field("manager_dn", &self.manager_dn)
            .field("manager_password", &"[REDACTED]")
            .field("search_attribute", &self.search_attribute)
            .field("attributes", &self.attributes)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::InvalidConfig("directory.host is required".into()));
        }
        if self.port == 0 {
            return Err(crate::Error::InvalidConfig("directory.port must not be 0".into()));
        }
        if self.use_tls && self.start_tls {
            return Err(crate::Error::InvalidConfig(
                "directory.use_tls and directory.start_tls are mutually exclusive".into(),
            ));
        }
        if self.search_base.trim().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "directory.search_base is required".into(),
            ));
        }
        if self.manager_dn.trim().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "directory.manager_dn is required".into(),
            ));
        }
        if self.search_attribute.trim().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "directory.search_attribute is required".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(crate::Error::InvalidConfig(
                "directory.timeout_seconds must be greater than 0".into(),
            ));
        }
        self.attributes.validate()
    }
}

/// LDAP attribute names read from a user entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAttributes {
    /// Administrator flag ("1" grants administrator rights)
    #[serde(default = "default_admin_flag_attr")]
    pub admin_flag: String,

    /// First day of validity (`yyyy/MM/dd`)
    #[serde(default = "default_valid_from_attr")]
    pub valid_from: String,

    /// Last day of validity (`yyyy/MM/dd`, blank for no expiry)
    #[serde(default = "default_valid_until_attr")]
    pub valid_until: String,

    /// Key of the user's local profile rows
    #[serde(default = "default_local_user_id_attr")]
    pub local_user_id: String,
}

fn default_admin_flag_attr() -> String {
    "adminFlag".to_string()
}

fn default_valid_from_attr() -> String {
    "validFrom".to_string()
}

fn default_valid_until_attr() -> String {
    "validUntil".to_string()
}

fn default_local_user_id_attr() -> String {
    "uid".to_string()
}

impl Default for EntryAttributes {
    fn default() -> Self {
        Self {
            admin_flag: default_admin_flag_attr(),
            valid_from: default_valid_from_attr(),
            valid_until: default_valid_until_attr(),
            local_user_id: default_local_user_id_attr(),
        }
    }
}

impl EntryAttributes {
    /// Attribute list requested from the directory, in a fixed order
    pub fn requested(&self) -> Vec<String> {
        vec![
            self.admin_flag.clone(),
            self.valid_from.clone(),
            self.valid_until.clone(),
            self.local_user_id.clone(),
        ]
    }

    pub fn validate(&self) -> crate::Result<()> {
        for (key, value) in [
            ("admin_flag", &self.admin_flag),
            ("valid_from", &self.valid_from),
            ("valid_until", &self.valid_until),
            ("local_user_id", &self.local_user_id),
        ] {
            if value.trim().is_empty() {
                return Err(crate::Error::InvalidConfig(format!(
                    "directory.attributes.{} must not be empty",
                    key
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://dirgate.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.trim().is_empty() {
            return Err(crate::Error::InvalidConfig("database.url is required".into()));
        }
        if self.max_connections == 0 {
            return Err(crate::Error::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    pub fn validate(&self) -> crate::Result<()> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(crate::Error::InvalidConfig(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                other
            ))),
        }
    }
}
