use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel key: the chat channel a session is scoped to, e.g. `1234567890`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(pub String);

impl ChannelKey {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self(channel_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
