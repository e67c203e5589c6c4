//! Pure pricing and break-even formulas.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::{self, AmountOverflow};

mod break_even;
mod pricing;

pub use break_even::{break_even, BreakEvenInput, BreakEvenResult, VariableCosts, DEFAULT_WORKING_DAYS};
pub use pricing::{quote, PricingInput, PricingQuote};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FinanceError {
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("working days must be greater than zero")]
    NoWorkingDays,
    #[error("percentages plus margin must stay below 100% (got {0}%)")]
    UndefinedRatio(Decimal),
    #[error(transparent)]
    Overflow(#[from] AmountOverflow),
}

/// Share of revenue left after removing `pct` percent; errors when nothing is left.
pub(crate) fn remaining_ratio(pct: Decimal) -> Result<Decimal, FinanceError> {
    if pct >= Decimal::ONE_HUNDRED {
        return Err(FinanceError::UndefinedRatio(pct));
    }
    Ok(Decimal::ONE - pct / Decimal::ONE_HUNDRED)
}

/// `amount / ratio`, where `ratio` is a remaining share in `(0, 1]`.
pub(crate) fn gross_up(what: &'static str, amount: Decimal, ratio: Decimal) -> Result<Decimal, FinanceError> {
    Ok(money::checked(what, amount.checked_div(ratio))?)
}
