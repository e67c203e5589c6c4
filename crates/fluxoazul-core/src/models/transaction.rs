use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::{record_id, require_text, Record, Table, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Revenue,
    Expense,
}

/// Ledger category. Unknown or missing categories collapse into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Sales,
    Services,
    SalesTaxes,
    Returns,
    Discounts,
    Suppliers,
    Payroll,
    OwnerDraw,
    Rent,
    Utilities,
    Marketing,
    CardFees,
    Commissions,
    Administrative,
    FinancialExpenses,
    IncomeTax,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sales => "sales",
            Category::Services => "services",
            Category::SalesTaxes => "sales_taxes",
            Category::Returns => "returns",
            Category::Discounts => "discounts",
            Category::Suppliers => "suppliers",
            Category::Payroll => "payroll",
            Category::OwnerDraw => "owner_draw",
            Category::Rent => "rent",
            Category::Utilities => "utilities",
            Category::Marketing => "marketing",
            Category::CardFees => "card_fees",
            Category::Commissions => "commissions",
            Category::Administrative => "administrative",
            Category::FinancialExpenses => "financial_expenses",
            Category::IncomeTax => "income_tax",
            Category::Other => "other",
        }
    }

    pub fn from_slug(slug: &str) -> Category {
        match slug.trim().to_ascii_lowercase().as_str() {
            "sales" => Category::Sales,
            "services" => Category::Services,
            "sales_taxes" => Category::SalesTaxes,
            "returns" => Category::Returns,
            "discounts" => Category::Discounts,
            "suppliers" => Category::Suppliers,
            "payroll" => Category::Payroll,
            "owner_draw" => Category::OwnerDraw,
            "rent" => Category::Rent,
            "utilities" => Category::Utilities,
            "marketing" => Category::Marketing,
            "card_fees" => Category::CardFees,
            "commissions" => Category::Commissions,
            "administrative" => Category::Administrative,
            "financial_expenses" => Category::FinancialExpenses,
            "income_tax" => Category::IncomeTax,
            _ => Category::Other,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from_slug(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_paid() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Uuid,
    pub date: Date,
    pub description: String,
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: Category,
    pub amount: Decimal,
    #[serde(default = "default_paid")]
    pub paid: bool,
    #[serde(default)]
    pub contact_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(date: Date, description: &str, kind: TransactionKind, category: Category, amount: Decimal) -> Self {
        Self {
            id: Uuid::nil(),
            date,
            description: description.to_string(),
            kind,
            category,
            amount,
            paid: true,
            contact_id: None,
        }
    }
}

impl Record for Transaction {
    const TABLE: Table = Table::Transactions;

    record_id!();

    // Zero and negative amounts are legitimate adjustments.
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description)
    }
}
