use std::collections::BTreeMap;

use {
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{
    amount::parse_amount,
    error::{LedgerError, Result},
};

/// Chat-platform user id of a participant.
pub type PlayerId = String;

/// Running totals for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAccount {
    pub display_name: String,
    pub cash_contributed: i64,
}

impl PlayerAccount {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            cash_contributed: 0,
        }
    }
}

/// One active loot run.
///
/// The roster is fixed at creation and never empty. Players iterate in
/// ascending id order, which is also the order of settlement transfers.
/// The serialized form is the persisted session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    total_item_value: i64,
    tax_percent: u8,
    players: BTreeMap<PlayerId, PlayerAccount>,
    leader_id: PlayerId,
}

impl Session {
    /// Create a session for `roster` (id, display name) pairs.
    ///
    /// Blank ids are dropped; duplicate ids keep the first display name.
    pub fn new<I>(leader_id: impl Into<PlayerId>, roster: I, tax_percent: i64) -> Result<Self>
    where
        I: IntoIterator<Item = (PlayerId, String)>,
    {
        let tax_percent = validate_tax(tax_percent)?;

        let mut players = BTreeMap::new();
        for (id, display_name) in roster {
            let id = id.trim().to_string();
            if id.is_empty() {
                continue;
            }
            players
                .entry(id)
                .or_insert_with(|| PlayerAccount::new(display_name));
        }
        if players.is_empty() {
            return Err(LedgerError::EmptyRoster);
        }

        Ok(Self {
            total_item_value: 0,
            tax_percent,
            players,
            leader_id: leader_id.into(),
        })
    }

    pub fn total_item_value(&self) -> i64 {
        self.total_item_value
    }

    pub fn tax_percent(&self) -> u8 {
        self.tax_percent
    }

    pub fn leader_id(&self) -> &str {
        &self.leader_id
    }

    pub fn players(&self) -> &BTreeMap<PlayerId, PlayerAccount> {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&PlayerAccount> {
        self.players.get(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Sum of cash collected by every player.
    ///
    /// `add_cash` and `validate` keep this sum within `i64`; a record that
    /// bypassed both saturates instead of wrapping.
    pub fn cash_pool_total(&self) -> i64 {
        self.checked_cash_pool().unwrap_or(i64::MAX)
    }

    fn checked_cash_pool(&self) -> Option<i64> {
        self.players
            .values()
            .try_fold(0i64, |total, p| total.checked_add(p.cash_contributed))
    }

    /// Credit `amount_text` of looted cash to `player_id`.
    ///
    /// Returns the parsed amount. Nothing changes on error.
    pub fn add_cash(&mut self, player_id: &str, amount_text: &str) -> Result<i64> {
        let amount = parse_amount(amount_text)?;
        if amount < 0 {
            return Err(LedgerError::NegativeCashAmount { amount });
        }
        let out_of_range = || LedgerError::AmountOutOfRange {
            input: amount_text.to_string(),
        };
        // The pool total must stay representable, not just this player's.
        self.checked_cash_pool()
            .and_then(|pool| pool.checked_add(amount))
            .ok_or_else(out_of_range)?;

        let account = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| LedgerError::UnknownPlayer(player_id.to_string()))?;
        account.cash_contributed = account
            .cash_contributed
            .checked_add(amount)
            .ok_or_else(out_of_range)?;
        debug!(player_id, amount, total = account.cash_contributed, "cash added");
        Ok(amount)
    }

    /// Add `amount_text` worth of items to the shared pool. Negative amounts
    /// are corrections.
    ///
    /// Returns the parsed amount. Nothing changes on error.
    pub fn add_items(&mut self, amount_text: &str) -> Result<i64> {
        let amount = parse_amount(amount_text)?;
        self.total_item_value = self.total_item_value.checked_add(amount).ok_or_else(|| {
            LedgerError::AmountOutOfRange {
                input: amount_text.to_string(),
            }
        })?;
        debug!(amount, total = self.total_item_value, "items added");
        Ok(amount)
    }

    /// Check the invariants a deserialized record may have lost.
    pub fn validate(&self) -> Result<()> {
        validate_tax(i64::from(self.tax_percent))?;
        if self.players.is_empty() {
            return Err(LedgerError::EmptySession);
        }
        if let Some(account) = self.players.values().find(|p| p.cash_contributed < 0) {
            return Err(LedgerError::NegativeCashAmount {
                amount: account.cash_contributed,
            });
        }
        if self.checked_cash_pool().is_none() {
            return Err(LedgerError::CashPoolOverflow);
        }
        Ok(())
    }
}

fn validate_tax(tax_percent: i64) -> Result<u8> {
    match u8::try_from(tax_percent) {
        Ok(tax) if tax <= 100 => Ok(tax),
        _ => Err(LedgerError::InvalidTaxPercent(tax_percent)),
    }
}
