//! Loot ledger: amount parsing, the per-channel session model and the
//! settlement engine.
//!
//! Money is tracked as `i64` minor units (silver). Shares and balances are
//! real-valued and only rounded when rendered.

pub mod amount;
pub mod error;
pub mod format;
pub mod session;
pub mod settlement;

pub use {
    amount::parse_amount,
    error::{LedgerError, Result},
    session::{PlayerAccount, PlayerId, Session},
    settlement::{LeaderNet, PaymentPlan, SettlementReport, Transfer, settle},
};
