use std::collections::{BTreeMap, btree_map::Entry};

use {lootsplit_ledger::Session, thiserror::Error, tracing::warn};

use crate::key::ChannelKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("a loot session is already active in channel {0}")]
    SessionAlreadyActive(ChannelKey),

    #[error("no active loot session in channel {0}")]
    NoActiveSession(ChannelKey),
}

/// In-memory map of channel → active session. At most one session per
/// channel; a second `create` for the same channel is refused rather than
/// overwriting live contributions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    sessions: BTreeMap<ChannelKey, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted `(key, session)` pairs.
    ///
    /// Records that break session invariants are skipped; a repeated key
    /// keeps the later record.
    pub fn from_snapshot(pairs: Vec<(ChannelKey, Session)>) -> Self {
        let mut sessions = BTreeMap::new();
        for (key, session) in pairs {
            if let Err(e) = session.validate() {
                warn!(channel = %key, error = %e, "skipping invalid persisted session");
                continue;
            }
            if sessions.insert(key.clone(), session).is_some() {
                warn!(channel = %key, "duplicate persisted session, keeping the later one");
            }
        }
        Self { sessions }
    }

    /// Ordered `(key, session)` pairs, the persisted form of the store.
    pub fn snapshot(&self) -> Vec<(&ChannelKey, &Session)> {
        self.sessions.iter().collect()
    }

    pub fn contains(&self, key: &ChannelKey) -> bool {
        self.sessions.contains_key(key)
    }

    pub fn get(&self, key: &ChannelKey) -> Result<&Session, StoreError> {
        self.sessions
            .get(key)
            .ok_or_else(|| StoreError::NoActiveSession(key.clone()))
    }

    pub fn get_mut(&mut self, key: &ChannelKey) -> Result<&mut Session, StoreError> {
        self.sessions
            .get_mut(key)
            .ok_or_else(|| StoreError::NoActiveSession(key.clone()))
    }

    /// Publish a new session for `key`.
    pub fn create(&mut self, key: ChannelKey, session: Session) -> Result<&Session, StoreError> {
        match self.sessions.entry(key) {
            Entry::Occupied(entry) => Err(StoreError::SessionAlreadyActive(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(session)),
        }
    }

    /// Remove and return the session for `key`.
    pub fn remove(&mut self, key: &ChannelKey) -> Result<Session, StoreError> {
        self.sessions
            .remove(key)
            .ok_or_else(|| StoreError::NoActiveSession(key.clone()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ChannelKey> {
        self.sessions.keys()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
