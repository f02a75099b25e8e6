use std::collections::{BTreeMap, HashMap};

use {
    anyhow::{Result, anyhow},
    async_trait::async_trait,
};

/// A resolved chat member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub display_name: String,
}

/// Looks up members of the guild/workspace a channel belongs to. Each
/// platform binding implements this.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Directory identifier (e.g. "discord", "static").
    fn id(&self) -> &str;

    /// Resolve a user id to a member. Errors mean "not a member" or a
    /// failed lookup; callers treat both as unresolved.
    async fn resolve(&self, user_id: &str) -> Result<Member>;
}

/// Directory backed by a fixed id → display name table, e.g. the
/// `[members]` config section.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    members: HashMap<String, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.members.insert(id.into(), display_name.into());
        self
    }
}

impl From<BTreeMap<String, String>> for StaticDirectory {
    fn from(members: BTreeMap<String, String>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }
}

#[async_trait]
impl MemberDirectory for StaticDirectory {
    fn id(&self) -> &str {
        "static"
    }

    async fn resolve(&self, user_id: &str) -> Result<Member> {
        let display_name = self
            .members
            .get(user_id)
            .ok_or_else(|| anyhow!("unknown member {user_id}"))?;
        Ok(Member {
            id: user_id.to_string(),
            display_name: display_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_directory_resolves_known_ids() {
        let dir = StaticDirectory::new().with_member("1", "Aria");
        assert_eq!(dir.resolve("1").await.unwrap(), Member {
            id: "1".into(),
            display_name: "Aria".into(),
        });
        assert!(dir.resolve("2").await.is_err());
    }

    #[tokio::test]
    async fn builds_from_config_table() {
        let table = BTreeMap::from([("1".to_string(), "Aria".to_string())]);
        let dir = StaticDirectory::from(table);
        assert_eq!(dir.id(), "static");
        assert_eq!(dir.resolve("1").await.unwrap().display_name, "Aria");
    }
}
