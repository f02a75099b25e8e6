use std::{sync::Arc, time::Duration};

use {
    lootsplit_channels::{Member, MemberDirectory, parse_mentions, resolve_roster},
    lootsplit_config::{LootsplitConfig, RosterPolicy},
    lootsplit_ledger::{LedgerError, PlayerId, Session, SettlementReport, settle},
    lootsplit_sessions::{ChannelKey, SessionPersistence, SessionStore, store::StoreError},
    tokio::sync::RwLock,
    tracing::{debug, info, warn},
};

use crate::error::CommandError;

type Result<T, E = CommandError> = std::result::Result<T, E>;

/// Who is invoking a command, with the authorization decision already made
/// by the platform binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub authorized: bool,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, authorized: bool) -> Self {
        Self {
            user_id: user_id.into(),
            authorized,
        }
    }

    fn require_authorized(&self) -> Result<()> {
        if self.authorized {
            Ok(())
        } else {
            Err(CommandError::Unauthorized)
        }
    }
}

/// Tunables the service takes from config.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub default_tax_percent: u8,
    pub roster_policy: RosterPolicy,
    pub resolve_timeout: Option<Duration>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&LootsplitConfig::default())
    }
}

impl ServiceSettings {
    pub fn from_config(config: &LootsplitConfig) -> Self {
        Self {
            default_tax_percent: config.ledger.default_tax_percent,
            roster_policy: config.roster.policy,
            resolve_timeout: config.roster.resolve_timeout(),
        }
    }
}

/// Result of a successful `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    pub leader_id: PlayerId,
    pub tax_percent: u8,
    pub roster: Vec<Member>,
    /// Mentioned ids that were left out because they did not resolve.
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashAdded {
    pub player_id: PlayerId,
    pub display_name: String,
    pub amount: i64,
    pub player_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsAdded {
    pub amount: i64,
    pub pool_total: i64,
}

/// One player's line in a status summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCash {
    pub player_id: PlayerId,
    pub display_name: String,
    pub cash: i64,
}

/// Running totals of an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub item_pool_total: i64,
    pub cash_pool_total: i64,
    pub tax_percent: u8,
    pub players: Vec<PlayerCash>,
}

impl StatusReport {
    fn of(session: &Session) -> Self {
        Self {
            item_pool_total: session.total_item_value(),
            cash_pool_total: session.cash_pool_total(),
            tax_percent: session.tax_percent(),
            players: session
                .players()
                .iter()
                .map(|(id, account)| PlayerCash {
                    player_id: id.clone(),
                    display_name: account.display_name.clone(),
                    cash: account.cash_contributed,
                })
                .collect(),
        }
    }
}

/// Owns the session store and runs commands against it.
pub struct LootService {
    store: RwLock<SessionStore>,
    persistence: Arc<dyn SessionPersistence>,
    directory: Arc<dyn MemberDirectory>,
    settings: ServiceSettings,
}

impl LootService {
    /// Build a service around the snapshot `persistence` currently holds.
    pub fn load(
        persistence: Arc<dyn SessionPersistence>,
        directory: Arc<dyn MemberDirectory>,
        settings: ServiceSettings,
    ) -> anyhow::Result<Self> {
        let store = persistence.load()?;
        Ok(Self {
            store: RwLock::new(store),
            persistence,
            directory,
            settings,
        })
    }

    /// Channels with an active session.
    pub async fn active_channels(&self) -> Vec<ChannelKey> {
        self.store.read().await.keys().cloned().collect()
    }

    /// Open a session in `channel` for the members mentioned in `mentions`.
    /// The caller becomes the leader.
    pub async fn start(
        &self,
        channel: &ChannelKey,
        caller: &Caller,
        mentions: &str,
        tax_percent: Option<i64>,
    ) -> Result<Started> {
        caller.require_authorized()?;
        if self.store.read().await.contains(channel) {
            return Err(StoreError::SessionAlreadyActive(channel.clone()).into());
        }

        let user_ids = parse_mentions(mentions);
        if user_ids.is_empty() {
            return Err(LedgerError::EmptyRoster.into());
        }
        let tax_percent =
            tax_percent.unwrap_or_else(|| i64::from(self.settings.default_tax_percent));

        // Lookups run without holding the store lock.
        let resolution = resolve_roster(
            self.directory.as_ref(),
            &user_ids,
            self.settings.resolve_timeout,
        )
        .await;
        if self.settings.roster_policy == RosterPolicy::RejectUnresolved
            && !resolution.is_complete()
        {
            return Err(CommandError::UnresolvedMentions(resolution.unresolved));
        }

        let session = Session::new(
            caller.user_id.clone(),
            resolution
                .members
                .iter()
                .map(|m| (m.id.clone(), m.display_name.clone())),
            tax_percent,
        )?;
        let tax_percent = session.tax_percent();

        let mut store = self.store.write().await;
        store.create(channel.clone(), session)?;
        self.persist(&store);
        info!(
            channel = %channel,
            leader = %caller.user_id,
            players = resolution.members.len(),
            unresolved = resolution.unresolved.len(),
            tax_percent,
            "loot session started"
        );

        Ok(Started {
            leader_id: caller.user_id.clone(),
            tax_percent,
            roster: resolution.members,
            unresolved: resolution.unresolved,
        })
    }

    /// Record cash looted by `player_id`.
    pub async fn add_cash(
        &self,
        channel: &ChannelKey,
        player_id: &str,
        amount_text: &str,
    ) -> Result<CashAdded> {
        let mut store = self.store.write().await;
        let session = store.get_mut(channel)?;
        let amount = session.add_cash(player_id, amount_text)?;
        let added = session
            .player(player_id)
            .map(|account| CashAdded {
                player_id: player_id.to_string(),
                display_name: account.display_name.clone(),
                amount,
                player_total: account.cash_contributed,
            })
            .ok_or_else(|| LedgerError::UnknownPlayer(player_id.to_string()))?;
        self.persist(&store);
        Ok(added)
    }

    /// Add item value (negative for corrections) to the shared pool.
    pub async fn add_items(&self, channel: &ChannelKey, amount_text: &str) -> Result<ItemsAdded> {
        let mut store = self.store.write().await;
        let session = store.get_mut(channel)?;
        let amount = session.add_items(amount_text)?;
        let added = ItemsAdded {
            amount,
            pool_total: session.total_item_value(),
        };
        self.persist(&store);
        Ok(added)
    }

    pub async fn status(&self, channel: &ChannelKey) -> Result<StatusReport> {
        let store = self.store.read().await;
        Ok(StatusReport::of(store.get(channel)?))
    }

    /// Settle and close the session.
    pub async fn finalize(
        &self,
        channel: &ChannelKey,
        caller: &Caller,
    ) -> Result<SettlementReport> {
        caller.require_authorized()?;
        let mut store = self.store.write().await;
        let report = settle(store.get(channel)?)?;
        store.remove(channel)?;
        self.persist(&store);
        info!(
            channel = %channel,
            by = %caller.user_id,
            transfers = report.plan.transfers().len(),
            "loot session finalized"
        );
        Ok(report)
    }

    /// Discard the session without a report.
    pub async fn cancel(&self, channel: &ChannelKey, caller: &Caller) -> Result<()> {
        caller.require_authorized()?;
        let mut store = self.store.write().await;
        store.remove(channel)?;
        self.persist(&store);
        info!(channel = %channel, by = %caller.user_id, "loot session cancelled");
        Ok(())
    }

    /// Save the store. Failures leave memory as-is; the next successful
    /// save catches the disk up.
    ///
    /// Called with the store write guard held, so snapshots reach disk in
    /// mutation order; the blocking write is a small file per command.
    fn persist(&self, store: &SessionStore) {
        match self.persistence.save(store) {
            Ok(()) => debug!(sessions = store.len(), "session store persisted"),
            Err(e) => warn!(error = %e, "failed to persist sessions, keeping in-memory state"),
        }
    }
}
