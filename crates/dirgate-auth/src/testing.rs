//! In-memory directory and user record store for tests

use async_trait::async_trait;
use dirgate_core::types::{DirectoryEntry, ProfileRow, SearchScope};
use dirgate_metadata::UserRecordStore;
use secrecy::{ExposeSecret, SecretString};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::directory::{build_search_filter, DirectoryConnection, DirectoryConnector, EntryStream};
use crate::error::{DirectoryError, DirectoryResult};

/// Outcome of a bind against [`FakeDirectory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindBehavior {
    Bound,
    NotBound,
    InvalidCredentials,
    Fail(u32),
    /// Compare the secret with the password registered for the DN
    CheckPassword,
}

impl BindBehavior {
    fn outcome(self, expected: Option<&str>, secret: &SecretString) -> DirectoryResult<bool> {
        match self {
            BindBehavior::Bound => Ok(true),
            BindBehavior::NotBound => Ok(false),
            BindBehavior::InvalidCredentials => Err(DirectoryError::InvalidCredentials),
            BindBehavior::Fail(rc) => Err(DirectoryError::Protocol {
                rc,
                message: "simulated failure".to_string(),
            }),
            BindBehavior::CheckPassword => match expected {
                _ if secret.expose_secret().is_empty() => Ok(false),
                Some(password) if password == secret.expose_secret() => Ok(true),
                _ => Err(DirectoryError::InvalidCredentials),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSearch {
    pub base: String,
    pub scope: SearchScope,
    pub filter: String,
    pub attributes: Vec<String>,
}

struct DirectoryState {
    entries: HashMap<String, Vec<DirectoryEntry>>,
    passwords: HashMap<String, String>,
    manager_bind: BindBehavior,
    user_bind: BindBehavior,
    unreachable: bool,
    panic_on_search: bool,
    fail_stream_after: Option<usize>,
    connects: usize,
    disconnects: usize,
    bound_dns: Vec<String>,
    searches: Vec<RecordedSearch>,
}

/// Directory double keyed by `uid` filter.
///
/// The first bind of a connection follows the manager behavior, later binds
/// follow the user behavior.
#[derive(Clone)]
pub struct FakeDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DirectoryState {
                entries: HashMap::new(),
                passwords: HashMap::new(),
                manager_bind: BindBehavior::Bound,
                user_bind: BindBehavior::CheckPassword,
                unreachable: false,
                panic_on_search: false,
                fail_stream_after: None,
                connects: 0,
                disconnects: 0,
                bound_dns: Vec::new(),
                searches: Vec::new(),
            })),
        }
    }

    fn update(self, f: impl FnOnce(&mut DirectoryState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_user(self, identifier: &str, entries: Vec<DirectoryEntry>) -> Self {
        let filter = build_search_filter("uid", identifier);
        self.update(|s| {
            s.entries.insert(filter, entries);
        })
    }

    pub fn with_password(self, dn: &str, password: &str) -> Self {
        self.update(|s| {
            s.passwords.insert(dn.to_string(), password.to_string());
        })
    }

    pub fn with_manager_bind(self, behavior: BindBehavior) -> Self {
        self.update(|s| s.manager_bind = behavior)
    }

    pub fn with_user_bind(self, behavior: BindBehavior) -> Self {
        self.update(|s| s.user_bind = behavior)
    }

    pub fn unreachable(self) -> Self {
        self.update(|s| s.unreachable = true)
    }

    pub fn panicking_search(self) -> Self {
        self.update(|s| s.panic_on_search = true)
    }

    /// Streams fail with a timeout after yielding `count` entries
    pub fn failing_stream_after(self, count: usize) -> Self {
        self.update(|s| s.fail_stream_after = Some(count))
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn disconnects(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    /// Every DN a bind was attempted for, in order
    pub fn bound_dns(&self) -> Vec<String> {
        self.state.lock().unwrap().bound_dns.clone()
    }

    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.state.lock().unwrap().searches.clone()
    }
}

#[async_trait]
impl DirectoryConnector for FakeDirectory {
    async fn connect(&self, host: &str, port: u16) -> DirectoryResult<Box<dyn DirectoryConnection>> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if state.unreachable {
            return Err(DirectoryError::Connect(format!("{}:{} refused", host, port)));
        }
        Ok(Box::new(FakeConnection {
            state: Arc::clone(&self.state),
            binds: 0,
        }))
    }
}

struct FakeConnection {
    state: Arc<Mutex<DirectoryState>>,
    binds: usize,
}

#[async_trait]
impl DirectoryConnection for FakeConnection {
    async fn bind_as(&mut self, dn: &str, secret: &SecretString) -> DirectoryResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.bound_dns.push(dn.to_string());
        self.binds += 1;

        let behavior = if self.binds == 1 {
            state.manager_bind
        } else {
            state.user_bind
        };
        behavior.outcome(state.passwords.get(dn).map(String::as_str), secret)
    }

    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Box<dyn EntryStream>> {
        let (entries, panic_on_search, fail_after) = {
            let mut state = self.state.lock().unwrap();
            state.searches.push(RecordedSearch {
                base: base.to_string(),
                scope,
                filter: filter.to_string(),
                attributes: attributes.to_vec(),
            });
            (
                state.entries.get(filter).cloned().unwrap_or_default(),
                state.panic_on_search,
                state.fail_stream_after,
            )
        };

        // raised outside the lock so the counters stay readable
        if panic_on_search {
            panic!("simulated search panic");
        }

        Ok(Box::new(FakeEntryStream {
            entries: entries.into(),
            remaining_before_failure: fail_after,
        }))
    }

    async fn disconnect(&mut self) -> DirectoryResult<()> {
        self.state.lock().unwrap().disconnects += 1;
        Ok(())
    }
}

struct FakeEntryStream {
    entries: VecDeque<DirectoryEntry>,
    remaining_before_failure: Option<usize>,
}

#[async_trait]
impl EntryStream for FakeEntryStream {
    async fn next_entry(&mut self) -> DirectoryResult<Option<DirectoryEntry>> {
        if let Some(remaining) = self.remaining_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(DirectoryError::Timeout);
            }
            *remaining -= 1;
        }
        Ok(self.entries.pop_front())
    }
}

/// User record store double that counts lookups
#[derive(Clone, Default)]
pub struct FakeUserStore {
    rows: Arc<Mutex<HashMap<String, Vec<ProfileRow>>>>,
    calls: Arc<Mutex<usize>>,
    fail: bool,
}

impl FakeUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `count` profile rows for `user_id`
    pub fn with_rows(self, user_id: &str, count: usize) -> Self {
        for i in 0..count {
            let mut row = ProfileRow::new(user_id, format!("C{:02}", i + 1), format!("ORG{}", i + 1));
            row.is_primary = i == 0;
            self.rows
                .lock()
                .unwrap()
                .entry(user_id.to_string())
                .or_default()
                .push(row);
        }
        self
    }

    pub fn with_row(self, row: ProfileRow) -> Self {
        self.rows
            .lock()
            .unwrap()
            .entry(row.user_id.clone())
            .or_default()
            .push(row);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl UserRecordStore for FakeUserStore {
    async fn find_by_user_id(&self, user_id: &str) -> dirgate_core::Result<Vec<ProfileRow>> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(dirgate_core::Error::DatabaseError(
                "database is locked".to_string(),
            ));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}
