use {lootsplit_ledger::LedgerError, lootsplit_sessions::store::StoreError, thiserror::Error};

/// Errors surfaced to the user by a command. Every one of them means the
/// command changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("you do not have permission to use this command")]
    Unauthorized,

    #[error("could not find these members: {}", .0.join(", "))]
    UnresolvedMentions(Vec<String>),
}
