use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{record_id, require_text, Record, Table, ValidationError};
use crate::{
    calc::{self, PricingInput, PricingQuote},
    money::{checked, require_non_negative, AmountOverflow},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    #[serde(default)]
    pub min_quantity: Decimal,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    pub fn stock_value(&self) -> Result<Decimal, AmountOverflow> {
        checked("stock_value", self.quantity.checked_mul(self.unit_cost))
    }

    /// Applies a signed stock movement. The quantity never goes below zero.
    pub fn adjust(&mut self, delta: Decimal) -> Result<Decimal, ValidationError> {
        let quantity = checked("quantity", self.quantity.checked_add(delta))?;
        require_non_negative("quantity", quantity, ValidationError::Negative)?;
        self.quantity = quantity;
        Ok(quantity)
    }
}

impl Record for InventoryItem {
    const TABLE: Table = Table::Inventory;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_non_negative("quantity", self.quantity, ValidationError::Negative)?;
        require_non_negative("unit_cost", self.unit_cost, ValidationError::Negative)?;
        require_non_negative("min_quantity", self.min_quantity, ValidationError::Negative)
    }
}

/// A saved pricing-calculator entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingItem {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    pub input: PricingInput,
}

impl PricingItem {
    pub fn quote(&self) -> Result<PricingQuote, calc::FinanceError> {
        calc::quote(&self.input)
    }
}

impl Record for PricingItem {
    const TABLE: Table = Table::PricingItems;

    record_id!();

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        self.quote()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flour() -> InventoryItem {
        InventoryItem {
            id: Uuid::nil(),
            name: "Farinha".to_string(),
            sku: Some("FAR-01".to_string()),
            quantity: dec!(12),
            unit_cost: dec!(4.5),
            min_quantity: dec!(10),
        }
    }

    #[test]
    fn test_adjust_stock() {
        let mut item = flour();
        assert_eq!(item.adjust(dec!(-2)).unwrap(), dec!(10));
        assert!(item.is_low_stock());
        assert_eq!(item.stock_value(), Ok(dec!(45)));
        assert_eq!(item.adjust(dec!(-11)), Err(ValidationError::Negative("quantity")));
        assert_eq!(item.quantity, dec!(10));
    }

    #[test]
    fn test_adjust_and_value_overflow() {
        let mut item = InventoryItem { quantity: Decimal::MAX, ..flour() };
        assert_eq!(item.adjust(Decimal::ONE), Err(ValidationError::Overflow(AmountOverflow("quantity"))));
        assert_eq!(item.quantity, Decimal::MAX);
        assert_eq!(item.stock_value(), Err(AmountOverflow("stock_value")));
    }

    #[test]
    fn test_pricing_item_rejects_undefined_quote() {
        let item: PricingItem = serde_json::from_str(
            r#"{"name": "Bolo", "input": {"materials": 20, "taxes_pct": 50, "margin": 50}}"#,
        )
        .unwrap();
        assert!(matches!(item.validate(), Err(ValidationError::Finance(_))));
    }
}
