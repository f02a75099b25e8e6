//! Chat-platform seam.
//!
//! A platform binding (Discord, a local CLI, tests) supplies a
//! [`MemberDirectory`]; this crate turns raw mention text into a resolved
//! roster using it.

pub mod directory;
pub mod mention;
pub mod roster;

pub use {
    directory::{Member, MemberDirectory, StaticDirectory},
    mention::parse_mentions,
    roster::{RosterResolution, resolve_roster},
};
