use tracing::trace;

use crate::error::{LedgerError, Result};

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;

/// Parse shorthand silver notation into minor units.
///
/// The unit suffix is mandatory (`50k`, `1.25m`): a bare `10` is ambiguous
/// between silver and thousands, so it is rejected. A comma is accepted as
/// the decimal separator and negative values are allowed so item pools can
/// be corrected after the fact.
pub fn parse_amount(input: &str) -> Result<i64> {
    let invalid = || LedgerError::InvalidAmountFormat {
        input: input.to_string(),
    };

    let cleaned = input.trim().to_lowercase().replacen(',', ".", 1);
    let Some(unit) = cleaned.chars().last() else {
        return Err(invalid());
    };
    let multiplier = match unit {
        'k' => THOUSAND,
        'm' => MILLION,
        _ => return Err(invalid()),
    };

    let numeric = cleaned[..cleaned.len() - unit.len_utf8()].trim();
    let number: f64 = numeric.parse().map_err(|_| invalid())?;
    if !number.is_finite() {
        return Err(invalid());
    }

    // Half-up: ties go toward positive infinity.
    let rounded = (number * multiplier + 0.5).floor();
    if !(i64::MIN as f64..i64::MAX as f64).contains(&rounded) {
        return Err(LedgerError::AmountOutOfRange {
            input: input.to_string(),
        });
    }

    let value = rounded as i64;
    trace!(input, value, "parsed amount");
    Ok(value)
}
