//! Active loot sessions keyed by chat channel.
//!
//! The whole store is persisted as one JSON snapshot: an array of
//! `[channelKey, session]` pairs, rewritten atomically after each mutation.

pub mod key;
pub mod persist;
pub mod store;

pub use {
    key::ChannelKey,
    persist::{JsonFileStore, SessionPersistence},
    store::SessionStore,
};
