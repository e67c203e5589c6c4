use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{gross_up, remaining_ratio, FinanceError};
use crate::money::{checked, checked_sum, require_non_negative, AmountOverflow};

/// Cost components of one unit plus the percentages taken from the sale price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInput {
    pub materials: Decimal,
    #[serde(default)]
    pub labor: Decimal,
    #[serde(default)]
    pub fixed_allocation: Decimal,
    #[serde(default)]
    pub taxes_pct: Decimal,
    #[serde(default)]
    pub card_fee_pct: Decimal,
    #[serde(default)]
    pub commission_pct: Decimal,
    pub margin: Decimal,
}

impl PricingInput {
    pub fn direct_cost(&self) -> Result<Decimal, AmountOverflow> {
        checked_sum("direct_cost", [self.materials, self.labor, self.fixed_allocation])
    }

    pub fn fees_pct(&self) -> Result<Decimal, AmountOverflow> {
        checked_sum("fees_pct", [self.taxes_pct, self.card_fee_pct, self.commission_pct])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingQuote {
    pub direct_cost: Decimal,
    pub fees_pct: Decimal,
    pub margin_pct: Decimal,
    pub sale_price: Decimal,
    pub markup: Option<Decimal>,
    pub profit_per_unit: Decimal,
}

/// Sale price that covers the direct cost, the fees and the target margin.
pub fn quote(input: &PricingInput) -> Result<PricingQuote, FinanceError> {
    require_non_negative("materials", input.materials, FinanceError::Negative)?;
    require_non_negative("labor", input.labor, FinanceError::Negative)?;
    require_non_negative("fixed_allocation", input.fixed_allocation, FinanceError::Negative)?;
    require_non_negative("taxes_pct", input.taxes_pct, FinanceError::Negative)?;
    require_non_negative("card_fee_pct", input.card_fee_pct, FinanceError::Negative)?;
    require_non_negative("commission_pct", input.commission_pct, FinanceError::Negative)?;
    require_non_negative("margin", input.margin, FinanceError::Negative)?;

    let direct_cost = input.direct_cost()?;
    let fees_pct = input.fees_pct()?;
    let ratio = remaining_ratio(checked("fees_pct", fees_pct.checked_add(input.margin))?)?;
    let sale_price = gross_up("sale_price", direct_cost, ratio)?;
    let markup = if direct_cost.is_zero() {
        None
    } else {
        Some(checked("markup", sale_price.checked_div(direct_cost))?)
    };
    let profit_per_unit = checked("profit_per_unit", sale_price.checked_mul(input.margin / Decimal::ONE_HUNDRED))?;

    Ok(PricingQuote {
        direct_cost,
        fees_pct,
        margin_pct: input.margin,
        sale_price,
        markup,
        profit_per_unit,
    })
}
