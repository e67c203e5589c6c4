use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{gross_up, remaining_ratio, FinanceError};
use crate::money::{checked, checked_sum, require_non_negative, AmountOverflow};

pub const DEFAULT_WORKING_DAYS: u32 = 22;

/// Variable costs, each as a percentage of revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableCosts {
    pub suppliers: Decimal,
    pub taxes: Decimal,
    pub commissions: Decimal,
    pub card_fees: Decimal,
    pub marketing: Decimal,
    pub other: Decimal,
}

impl Default for VariableCosts {
    fn default() -> Self {
        Self {
            suppliers: dec!(30),
            taxes: dec!(6),
            commissions: dec!(3),
            card_fees: dec!(2.5),
            marketing: dec!(1),
            other: dec!(1),
        }
    }
}

impl VariableCosts {
    pub fn entries(&self) -> [(&'static str, Decimal); 6] {
        [
            ("suppliers", self.suppliers),
            ("taxes", self.taxes),
            ("commissions", self.commissions),
            ("card_fees", self.card_fees),
            ("marketing", self.marketing),
            ("other", self.other),
        ]
    }

    pub fn total(&self) -> Result<Decimal, AmountOverflow> {
        checked_sum("variable_pct", self.entries().iter().map(|(_, pct)| *pct))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenInput {
    pub fixed_costs: Decimal,
    #[serde(default)]
    pub owner_draw: Decimal,
    #[serde(default)]
    pub variable_costs: VariableCosts,
    pub margin: Decimal,
    #[serde(default = "default_working_days")]
    pub working_days: u32,
}

fn default_working_days() -> u32 {
    DEFAULT_WORKING_DAYS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    pub total_fixed: Decimal,
    pub variable_pct: Decimal,
    pub margin_pct: Decimal,
    pub contribution_margin_pct: Decimal,
    pub break_even_revenue: Decimal,
    pub daily_revenue: Decimal,
}

/// Revenue needed to cover fixed costs, the owner's draw and the desired margin.
///
/// `(fixed + draw) / (1 - variable% / 100 - margin% / 100)`
pub fn break_even(input: &BreakEvenInput) -> Result<BreakEvenResult, FinanceError> {
    require_non_negative("fixed_costs", input.fixed_costs, FinanceError::Negative)?;
    require_non_negative("owner_draw", input.owner_draw, FinanceError::Negative)?;
    require_non_negative("margin", input.margin, FinanceError::Negative)?;
    for (name, pct) in input.variable_costs.entries() {
        require_non_negative(name, pct, FinanceError::Negative)?;
    }
    if input.working_days == 0 {
        return Err(FinanceError::NoWorkingDays);
    }

    let variable_pct = input.variable_costs.total()?;
    let ratio = remaining_ratio(checked("variable_pct", variable_pct.checked_add(input.margin))?)?;
    let total_fixed = checked("total_fixed", input.fixed_costs.checked_add(input.owner_draw))?;
    let break_even_revenue = gross_up("break_even_revenue", total_fixed, ratio)?;

    Ok(BreakEvenResult {
        total_fixed,
        variable_pct,
        margin_pct: input.margin,
        contribution_margin_pct: ratio * Decimal::ONE_HUNDRED,
        break_even_revenue,
        daily_revenue: break_even_revenue / Decimal::from(input.working_days),
    })
}
