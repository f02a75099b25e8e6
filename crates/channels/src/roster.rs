use std::time::Duration;

use {
    anyhow::anyhow,
    futures::future::join_all,
    tracing::{debug, warn},
};

use crate::directory::{Member, MemberDirectory};

/// Outcome of resolving a list of mentioned user ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterResolution {
    /// Members that resolved, in mention order.
    pub members: Vec<Member>,
    /// Ids whose lookup failed or timed out, in mention order.
    pub unresolved: Vec<String>,
}

impl RosterResolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolve every id concurrently against `directory`.
///
/// All lookups run to completion (or `timeout`); a failed lookup never
/// aborts the others, it is reported in [`RosterResolution::unresolved`].
pub async fn resolve_roster(
    directory: &dyn MemberDirectory,
    user_ids: &[String],
    timeout: Option<Duration>,
) -> RosterResolution {
    let lookups = user_ids.iter().map(|id| async move {
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, directory.resolve(id))
                .await
                .unwrap_or_else(|_| Err(anyhow!("lookup timed out after {}ms", limit.as_millis()))),
            None => directory.resolve(id).await,
        };
        (id, result)
    });

    let mut resolution = RosterResolution::default();
    for (id, result) in join_all(lookups).await {
        match result {
            Ok(member) => resolution.members.push(member),
            Err(e) => {
                warn!(user_id = %id, directory = directory.id(), error = %e, "could not resolve member");
                resolution.unresolved.push(id.clone());
            },
        }
    }
    debug!(
        resolved = resolution.members.len(),
        unresolved = resolution.unresolved.len(),
        "roster resolved"
    );
    resolution
}
