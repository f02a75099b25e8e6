//! Configuration loading for lootsplit.
//!
//! Config files are discovered as `lootsplit.{toml,yaml,yml,json}` in the
//! working directory, then in `~/.config/lootsplit/`. `${VAR}` placeholders
//! are substituted from the environment before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        clear_config_dir, config_dir, data_dir, discover_and_load, load_config, set_config_dir,
    },
    schema::{AuthConfig, LedgerConfig, LootsplitConfig, RosterConfig, RosterPolicy, StorageConfig},
};
