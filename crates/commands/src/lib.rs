//! Loot session commands: the operations a chat binding calls.
//!
//! Lifecycle per channel:
//! 1. `start` resolves the mentioned roster and opens a session
//! 2. `add_cash` / `add_items` record contributions
//! 3. `status` summarizes the running totals
//! 4. `finalize` settles and closes, or `cancel` discards
//!
//! Authorization is decided by the caller and passed in as [`Caller`]. The
//! store is persisted after every successful mutation; a failed save is
//! logged and retried on the next one.

pub mod error;
pub mod render;
pub mod service;

pub use {
    error::CommandError,
    render::Renderer,
    service::{
        CashAdded, Caller, ItemsAdded, LootService, PlayerCash, ServiceSettings, Started,
        StatusReport,
    },
};
