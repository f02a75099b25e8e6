//! Plain-text replies for chat. Values are rounded and digit-grouped here
//! and nowhere else.

use std::fmt::Write;

use lootsplit_ledger::{
    LeaderNet, PaymentPlan, SettlementReport, format::group_thousands, settlement::round_display,
};

use crate::service::{CashAdded, ItemsAdded, Started, StatusReport};

fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Renders command results with a configured digit separator.
#[derive(Debug, Clone)]
pub struct Renderer {
    separator: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Renderer {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    fn silver(&self, value: i64) -> String {
        group_thousands(value, &self.separator)
    }

    pub fn started(&self, started: &Started) -> String {
        let mut out = String::from("Loot session started\nPlayers:\n");
        for member in &started.roster {
            let _ = writeln!(out, "  {} ({})", mention(&member.id), member.display_name);
        }
        let _ = writeln!(out, "Guild tax: {}%", started.tax_percent);
        if !started.unresolved.is_empty() {
            let missing: Vec<String> = started.unresolved.iter().map(|id| mention(id)).collect();
            let _ = writeln!(out, "Not found, left out: {}", missing.join(" "));
        }
        out.push_str("Record loot with add-items and add-cash.");
        out
    }

    pub fn cash_added(&self, added: &CashAdded) -> String {
        format!(
            "Cash added: +{} silver for {} (total {}).",
            self.silver(added.amount),
            mention(&added.player_id),
            self.silver(added.player_total)
        )
    }

    pub fn items_added(&self, added: &ItemsAdded) -> String {
        if added.amount >= 0 {
            format!(
                "Items added: +{} silver to the shared pool (pool {}).",
                self.silver(added.amount),
                self.silver(added.pool_total)
            )
        } else {
            format!(
                "Correction: {} silver removed from the shared pool (pool {}).",
                self.silver(added.amount),
                self.silver(added.pool_total)
            )
        }
    }

    pub fn status(&self, status: &StatusReport) -> String {
        let mut out = String::from("Loot status\n");
        let _ = writeln!(out, "Item pool: {} silver", self.silver(status.item_pool_total));
        let _ = writeln!(out, "Cash pool: {} silver", self.silver(status.cash_pool_total));
        let _ = writeln!(out, "Tax: {}%", status.tax_percent);
        out.push_str("Cash collected:");
        for player in &status.players {
            let _ = write!(
                out,
                "\n  {}: {}",
                mention(&player.player_id),
                self.silver(player.cash)
            );
        }
        out
    }

    pub fn settlement(&self, report: &SettlementReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Loot split report (leader {})", mention(&report.leader_id));
        let _ = writeln!(out, "Item pool: {}", self.silver(report.item_pool_total));
        let _ = writeln!(out, "Cash pool: {}", self.silver(report.cash_pool_total));
        let _ = writeln!(out, "Tax: {}%", report.tax_percent);
        let _ = writeln!(
            out,
            "Item share per player: {} silver",
            self.silver(report.rounded_item_share())
        );
        let _ = writeln!(
            out,
            "Cash share per player: {} silver",
            self.silver(report.rounded_cash_share())
        );
        out.push_str("Payment plan:");

        let transfers = match &report.plan {
            PaymentPlan::NoSettlementNeeded => {
                out.push_str("\n  Everyone already holds their share, no payments needed.");
                return out;
            },
            PaymentPlan::Transfers(transfers) => transfers,
        };
        for transfer in transfers {
            let _ = write!(
                out,
                "\n  {} -> {}: {} silver",
                mention(&transfer.from_id),
                mention(&transfer.to_id),
                self.silver(transfer.rounded_amount())
            );
        }
        let leader = mention(&report.leader_id);
        match report.leader_net {
            LeaderNet::Collects(amount) => {
                let _ = write!(
                    out,
                    "\n  Leader {leader} keeps {} silver as their own share.",
                    self.silver(round_display(amount))
                );
            },
            LeaderNet::Absorbs(amount) => {
                let _ = write!(
                    out,
                    "\n  Leader {leader} puts the {} silver collected above their share into the distribution.",
                    self.silver(round_display(amount))
                );
            },
            LeaderNet::Even | LeaderNet::NotOnRoster => {},
        }
        out
    }

    pub fn cancelled(&self) -> String {
        "The loot session in this channel was cancelled.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::service::PlayerCash,
        lootsplit_channels::Member,
        lootsplit_ledger::{Session, settle},
    };

    #[test]
    fn renders_started_with_unresolved() {
        let started = Started {
            leader_id: "1".into(),
            tax_percent: 10,
            roster: vec![Member {
                id: "1".into(),
                display_name: "Aria".into(),
            }],
            unresolved: vec!["9".into()],
        };
        let text = Renderer::default().started(&started);
        assert!(text.contains("<@1> (Aria)"));
        assert!(text.contains("Guild tax: 10%"));
        assert!(text.contains("left out: <@9>"));
    }

    #[test]
    fn renders_item_corrections_differently() {
        let r = Renderer::default();
        let added = r.items_added(&ItemsAdded {
            amount: 500_000,
            pool_total: 500_000,
        });
        assert_eq!(
            added,
            "Items added: +500.000 silver to the shared pool (pool 500.000)."
        );
        let corrected = r.items_added(&ItemsAdded {
            amount: -200_000,
            pool_total: 300_000,
        });
        assert!(corrected.starts_with("Correction: -200.000 silver"));
    }

    #[test]
    fn renders_status_breakdown() {
        let status = StatusReport {
            item_pool_total: 1_500_000,
            cash_pool_total: 51_500,
            tax_percent: 0,
            players: vec![
                PlayerCash {
                    player_id: "1".into(),
                    display_name: "Aria".into(),
                    cash: 0,
                },
                PlayerCash {
                    player_id: "2".into(),
                    display_name: "Bram".into(),
                    cash: 51_500,
                },
            ],
        };
        let text = Renderer::new(",").status(&status);
        assert!(text.contains("Item pool: 1,500,000 silver"));
        assert!(text.contains("<@2>: 51,500"));
        assert!(text.ends_with("<@1>: 0\n  <@2>: 51,500"));
    }

    #[test]
    fn renders_settlement_plan() {
        let roster = ["1", "2", "3"].map(|id| (id.to_string(), id.to_string()));
        let mut session = Session::new("1", roster, 0).unwrap();
        session.add_items("900k").unwrap();
        session.add_cash("2", "300k").unwrap();

        let text = Renderer::default().settlement(&settle(&session).unwrap());
        assert!(text.contains("Item share per player: 300.000 silver"));
        assert!(text.contains("<@2> -> <@1>: 200.000 silver"));
        assert!(text.contains("<@1> -> <@3>: 100.000 silver"));
        assert!(text.contains("Leader <@1> keeps 100.000 silver"));
    }

    #[test]
    fn renders_no_settlement_marker() {
        let roster = ["1", "2"].map(|id| (id.to_string(), id.to_string()));
        let session = Session::new("1", roster, 0).unwrap();
        let text = Renderer::default().settlement(&settle(&session).unwrap());
        assert!(text.ends_with("no payments needed."));
    }
}
