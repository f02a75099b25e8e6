//! Tax-adjusted split of a session's pools and the hub-routed payment plan.
//!
//! Every balancing payment clears through the session leader, who holds
//! the pooled items and silver. Two non-leader players are never netted
//! against each other, even when that would save a transfer.

use tracing::debug;

use crate::{
    error::{LedgerError, Result},
    session::{PlayerId, Session},
};

/// One payment line of the settlement plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from_id: PlayerId,
    pub to_id: PlayerId,
    /// Unrounded amount; see [`Transfer::rounded_amount`] for display.
    pub amount: f64,
}

impl Transfer {
    pub fn rounded_amount(&self) -> i64 {
        round_display(self.amount)
    }
}

/// The leader's own position after everyone else has been settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeaderNet {
    /// The leader collected less than its share and keeps this much more.
    Collects(f64),
    /// The leader collected more than its share and puts the excess into
    /// the distribution.
    Absorbs(f64),
    /// The leader collected exactly its share.
    Even,
    /// The leader is not on the roster and has no share of its own.
    NotOnRoster,
}

impl LeaderNet {
    fn from_balance(balance: f64) -> Self {
        if balance > 0.0 {
            Self::Collects(balance)
        } else if balance < 0.0 {
            Self::Absorbs(-balance)
        } else {
            Self::Even
        }
    }

    fn is_settled(&self) -> bool {
        matches!(self, Self::Even | Self::NotOnRoster)
    }
}

/// Outcome of the balancing step.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentPlan {
    /// Every player already holds exactly their share.
    NoSettlementNeeded,
    /// Ordered transfers between players and the leader.
    Transfers(Vec<Transfer>),
}

impl PaymentPlan {
    pub fn transfers(&self) -> &[Transfer] {
        match self {
            Self::NoSettlementNeeded => &[],
            Self::Transfers(transfers) => transfers,
        }
    }
}

/// Result of finalizing a session. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementReport {
    pub leader_id: PlayerId,
    pub item_pool_total: i64,
    pub cash_pool_total: i64,
    pub tax_percent: u8,
    pub item_share_per_player: f64,
    pub cash_share_per_player: f64,
    pub plan: PaymentPlan,
    pub leader_net: LeaderNet,
}

impl SettlementReport {
    pub fn rounded_item_share(&self) -> i64 {
        round_display(self.item_share_per_player)
    }

    pub fn rounded_cash_share(&self) -> i64 {
        round_display(self.cash_share_per_player)
    }
}

/// Split a pool after tax among `players`.
///
/// The pool is scaled by the untaxed percentage before a single division,
/// so integral shares come out exact.
fn post_tax_share(pool: i64, tax_percent: u8, players: usize) -> f64 {
    let kept = f64::from(100 - tax_percent.min(100));
    pool as f64 * kept / (100.0 * players as f64)
}

/// Half-up rounding used for every displayed value.
pub fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Compute the split and payment plan for `session`.
pub fn settle(session: &Session) -> Result<SettlementReport> {
    let n = session.player_count();
    if n == 0 {
        return Err(LedgerError::EmptySession);
    }

    let tax = session.tax_percent();
    let leader_id = session.leader_id();
    let cash_pool_total = session.cash_pool_total();
    let item_share = post_tax_share(session.total_item_value(), tax, n);
    let cash_share = post_tax_share(cash_pool_total, tax, n);

    let mut transfers = Vec::new();
    let mut leader_net = LeaderNet::NotOnRoster;
    for (id, account) in session.players() {
        let balance = cash_share - account.cash_contributed as f64;
        if id == leader_id {
            leader_net = LeaderNet::from_balance(balance);
            continue;
        }
        if balance > 0.0 {
            transfers.push(Transfer {
                from_id: leader_id.to_string(),
                to_id: id.clone(),
                amount: balance,
            });
        } else if balance < 0.0 {
            transfers.push(Transfer {
                from_id: id.clone(),
                to_id: leader_id.to_string(),
                amount: -balance,
            });
        }
    }

    let plan = if transfers.is_empty() && leader_net.is_settled() {
        PaymentPlan::NoSettlementNeeded
    } else {
        PaymentPlan::Transfers(transfers)
    };

    debug!(
        players = n,
        tax,
        cash_pool_total,
        item_pool_total = session.total_item_value(),
        transfers = plan.transfers().len(),
        "settled session"
    );

    Ok(SettlementReport {
        leader_id: leader_id.to_string(),
        item_pool_total: session.total_item_value(),
        cash_pool_total,
        tax_percent: tax,
        item_share_per_player: item_share,
        cash_share_per_player: cash_share,
        plan,
        leader_net,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn session(leader: &str, ids: &[&str], tax: i64) -> Session {
        let roster = ids.iter().map(|id| (id.to_string(), id.to_uppercase()));
        Session::new(leader, roster, tax).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn leader_holding_all_cash_pays_everyone() {
        let mut s = session("a", &["a", "b", "c"], 0);
        s.add_items("0.9k").unwrap();
        s.add_cash("a", "0.1k").unwrap();

        let report = settle(&s).unwrap();
        assert_eq!(report.item_pool_total, 900);
        assert_eq!(report.cash_pool_total, 100);
        assert_eq!(report.rounded_item_share(), 300);
        assert!(approx(report.cash_share_per_player, 100.0 / 3.0));

        let transfers = report.plan.transfers();
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].from_id, "a");
        assert_eq!(transfers[0].to_id, "b");
        assert_eq!(transfers[1].to_id, "c");
        assert_eq!(transfers[0].rounded_amount(), 33);

        match report.leader_net {
            LeaderNet::Absorbs(amount) => assert!(approx(amount, 200.0 / 3.0)),
            other => panic!("unexpected leader net: {other:?}"),
        }
    }

    #[test]
    fn surplus_players_pay_the_leader() {
        let mut s = session("a", &["a", "b", "c"], 0);
        s.add_cash("b", "3k").unwrap();

        let report = settle(&s).unwrap();
        assert_eq!(report.plan.transfers(), &[
            Transfer {
                from_id: "b".into(),
                to_id: "a".into(),
                amount: 2_000.0,
            },
            Transfer {
                from_id: "a".into(),
                to_id: "c".into(),
                amount: 1_000.0,
            },
        ]);
        assert_eq!(report.leader_net, LeaderNet::Collects(1_000.0));
    }

    #[test]
    fn non_leaders_are_never_netted_directly() {
        let mut s = session("a", &["a", "b", "c"], 0);
        s.add_cash("a", "1k").unwrap();
        s.add_cash("b", "2k").unwrap();

        let report = settle(&s).unwrap();
        let transfers = report.plan.transfers();
        // b owes 1k and c is owed 1k; both route through a.
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.from_id == "a" || t.to_id == "a"));
        assert_eq!(report.leader_net, LeaderNet::Even);
    }

    #[test]
    fn equal_contributions_need_no_settlement() {
        let mut s = session("a", &["a", "b", "c"], 0);
        for id in ["a", "b", "c"] {
            s.add_cash(id, "10k").unwrap();
        }
        let report = settle(&s).unwrap();
        assert_eq!(report.plan, PaymentPlan::NoSettlementNeeded);
        assert_eq!(report.leader_net, LeaderNet::Even);
        assert!(report.plan.transfers().is_empty());
    }

    #[test]
    fn empty_pools_need_no_settlement() {
        let report = settle(&session("a", &["a", "b"], 25)).unwrap();
        assert_eq!(report.plan, PaymentPlan::NoSettlementNeeded);
        assert_eq!(report.rounded_item_share(), 0);
    }

    #[test]
    fn tax_is_applied_to_each_pool_independently() {
        let mut s = session("a", &["a", "b"], 10);
        s.add_items("1m").unwrap();
        s.add_cash("b", "200k").unwrap();

        let report = settle(&s).unwrap();
        assert_eq!(report.tax_percent, 10);
        assert!(approx(report.item_share_per_player, 450_000.0));
        assert!(approx(report.cash_share_per_player, 90_000.0));
        assert_eq!(report.plan.transfers(), &[Transfer {
            from_id: "b".into(),
            to_id: "a".into(),
            amount: 110_000.0,
        }]);
        assert_eq!(report.leader_net, LeaderNet::Collects(90_000.0));
    }

    #[test]
    fn taxed_leader_surplus_is_still_reported() {
        // Everyone else is even, but the leader holds the taxed part.
        let mut s = session("a", &["a", "b"], 50);
        s.add_cash("a", "3k").unwrap();
        s.add_cash("b", "1k").unwrap();

        let report = settle(&s).unwrap();
        assert!(report.plan.transfers().is_empty());
        assert_eq!(report.plan, PaymentPlan::Transfers(Vec::new()));
        assert_eq!(report.leader_net, LeaderNet::Absorbs(2_000.0));
    }

    #[test]
    fn leader_off_roster_has_no_net_line() {
        let mut s = session("boss", &["a", "b"], 0);
        s.add_cash("a", "2k").unwrap();

        let report = settle(&s).unwrap();
        assert_eq!(report.leader_net, LeaderNet::NotOnRoster);
        assert_eq!(report.plan.transfers(), &[
            Transfer {
                from_id: "a".into(),
                to_id: "boss".into(),
                amount: 1_000.0,
            },
            Transfer {
                from_id: "boss".into(),
                to_id: "b".into(),
                amount: 1_000.0,
            },
        ]);
    }

    #[test]
    fn negative_item_pool_yields_negative_share() {
        let mut s = session("a", &["a", "b"], 0);
        s.add_items("-10k").unwrap();
        let report = settle(&s).unwrap();
        assert_eq!(report.rounded_item_share(), -5_000);
    }

    #[test]
    fn transfers_use_unrounded_balances() {
        let mut s = session("a", &["a", "b", "c"], 0);
        s.add_cash("a", "0.001k").unwrap();
        s.add_cash("b", "0.001k").unwrap();

        let report = settle(&s).unwrap();
        let transfers = report.plan.transfers();
        // Share is 2/3; b owes 1/3, c is owed 2/3.
        assert!(approx(transfers[0].amount, 1.0 / 3.0));
        assert_eq!(transfers[0].rounded_amount(), 0);
        assert!(approx(transfers[1].amount, 2.0 / 3.0));
        assert_eq!(transfers[1].rounded_amount(), 1);
    }

    #[test]
    fn half_up_display_rounding() {
        assert_eq!(round_display(2.5), 3);
        assert_eq!(round_display(-2.5), -2);
        assert_eq!(round_display(2.4999), 2);
    }
}
