use std::{
    fs,
    io::Write,
    path::PathBuf,
};

use {
    anyhow::{Context, Result},
    lootsplit_ledger::Session,
    serde_json::Value,
    tracing::{debug, info, warn},
};

use crate::{key::ChannelKey, store::SessionStore};

/// Load/save contract for the whole session store.
///
/// `load` runs once at startup; `save` runs after every successful
/// mutation and must never leave a half-written snapshot behind.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> Result<SessionStore>;
    fn save(&self, store: &SessionStore) -> Result<()>;
}

/// JSON snapshot file, e.g. `~/.lootsplit/sessions.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "sessions.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Decode each record on its own so one malformed session does not take
/// the rest of the snapshot down with it.
fn decode_records(records: Vec<(ChannelKey, Value)>) -> Vec<(ChannelKey, Session)> {
    records
        .into_iter()
        .filter_map(|(key, record)| match serde_json::from_value(record) {
            Ok(session) => Some((key, session)),
            Err(e) => {
                warn!(channel = %key, error = %e, "skipping unreadable persisted session");
                None
            },
        })
        .collect()
}

impl SessionPersistence for JsonFileStore {
    fn load(&self) -> Result<SessionStore> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no session snapshot, starting empty");
            return Ok(SessionStore::new());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if data.trim().is_empty() {
            return Ok(SessionStore::new());
        }
        let records: Vec<(ChannelKey, Value)> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        let store = SessionStore::from_snapshot(decode_records(records));
        info!(count = store.len(), path = %self.path.display(), "loaded active sessions");
        Ok(store)
    }

    fn save(&self, store: &SessionStore) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&store.snapshot())?;

        // Write beside the target and rename over it so a crash mid-write
        // leaves the previous snapshot intact.
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("failed to create {}", tmp.display()))?;
            file.write_all(data.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path).with_context(|| {
            format!("failed to move {} into place", self.path.display())
        })?;
        debug!(count = store.len(), path = %self.path.display(), "saved sessions");
        Ok(())
    }
}
