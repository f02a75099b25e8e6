use thiserror::Error;

/// Errors raised by ledger operations. None of them leave partial state
/// behind: the operation that produced one did not mutate anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid amount '{input}': use a number with a k or m suffix, e.g. 50k or 1.25m")]
    InvalidAmountFormat { input: String },

    #[error("amount '{input}' is out of range")]
    AmountOutOfRange { input: String },

    #[error("cash amounts cannot be negative (got {amount})")]
    NegativeCashAmount { amount: i64 },

    #[error("tax percent must be between 0 and 100 (got {0})")]
    InvalidTaxPercent(i64),

    #[error("no valid participants were supplied")]
    EmptyRoster,

    #[error("player {0} is not registered in this session")]
    UnknownPlayer(String),

    #[error("session has no players")]
    EmptySession,

    #[error("the session's cash pool does not fit in a 64-bit total")]
    CashPoolOverflow,
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
