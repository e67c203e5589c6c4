//! DRE (Demonstrativo de Resultado do Exercício) aggregation.

use std::{collections::BTreeMap, fmt::Display};

use prettytable::{row, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use fluxoazul_core::{
    money::{checked, format_brl, format_percent, AmountOverflow},
    Category, Transaction, TransactionKind,
};

/// Income statement line a transaction rolls up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DreGroup {
    GrossRevenue,
    Deduction,
    CostOfGoods,
    OperatingExpense,
    NonOperating,
}

pub fn classify(kind: TransactionKind, category: Category) -> DreGroup {
    match kind {
        TransactionKind::Revenue => DreGroup::GrossRevenue,
        TransactionKind::Expense => match category {
            Category::SalesTaxes | Category::Returns | Category::Discounts => DreGroup::Deduction,
            Category::Suppliers => DreGroup::CostOfGoods,
            Category::FinancialExpenses | Category::IncomeTax => DreGroup::NonOperating,
            _ => DreGroup::OperatingExpense,
        },
    }
}

/// Inclusive date range; open ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Period {
    #[serde(default)]
    pub from: Option<Date>,
    #[serde(default)]
    pub to: Option<Date>,
}

impl Period {
    pub fn new(from: Date, to: Date) -> Self {
        Self { from: Some(from), to: Some(to) }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub period: Period,
    pub gross_revenue: Decimal,
    pub deductions: Decimal,
    pub net_revenue: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    /// Includes cost of goods and uncategorized expenses.
    pub operating_expenses: Decimal,
    pub operating_result: Decimal,
    pub non_operating: Decimal,
    pub net_profit: Decimal,
    pub net_margin_pct: Option<Decimal>,
    pub revenue_by_category: BTreeMap<Category, Decimal>,
    pub expense_by_category: BTreeMap<Category, Decimal>,
    pub transaction_count: usize,
}

fn accumulate(total: &mut Decimal, amount: Decimal, what: &'static str) -> Result<(), AmountOverflow> {
    *total = checked(what, total.checked_add(amount))?;
    Ok(())
}

fn difference(what: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    checked(what, a.checked_sub(b))
}

/// Aggregates transactions inside `period` into an income statement.
pub fn build(transactions: &[Transaction], period: &Period) -> Result<IncomeStatement, AmountOverflow> {
    let mut statement = IncomeStatement {
        period: *period,
        ..Default::default()
    };

    for txn in transactions.iter().filter(|t| period.contains(t.date)) {
        statement.transaction_count += 1;
        let by_category = match txn.kind {
            TransactionKind::Revenue => &mut statement.revenue_by_category,
            TransactionKind::Expense => &mut statement.expense_by_category,
        };
        accumulate(by_category.entry(txn.category).or_insert(Decimal::ZERO), txn.amount, "category total")?;

        match classify(txn.kind, txn.category) {
            DreGroup::GrossRevenue => accumulate(&mut statement.gross_revenue, txn.amount, "gross_revenue")?,
            DreGroup::Deduction => accumulate(&mut statement.deductions, txn.amount, "deductions")?,
            DreGroup::CostOfGoods => {
                accumulate(&mut statement.cost_of_goods, txn.amount, "cost_of_goods")?;
                accumulate(&mut statement.operating_expenses, txn.amount, "operating_expenses")?;
            }
            DreGroup::OperatingExpense => accumulate(&mut statement.operating_expenses, txn.amount, "operating_expenses")?,
            DreGroup::NonOperating => accumulate(&mut statement.non_operating, txn.amount, "non_operating")?,
        }
    }

    statement.net_revenue = difference("net_revenue", statement.gross_revenue, statement.deductions)?;
    statement.gross_profit = difference("gross_profit", statement.net_revenue, statement.cost_of_goods)?;
    statement.operating_result = difference("operating_result", statement.net_revenue, statement.operating_expenses)?;
    statement.net_profit = difference("net_profit", statement.operating_result, statement.non_operating)?;
    // No margin for zero revenue or a ratio that does not fit.
    statement.net_margin_pct = statement
        .net_profit
        .checked_div(statement.gross_revenue)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

    Ok(statement)
}

impl Display for IncomeStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Line", "Amount"]);
        table.add_empty_row();
        table.add_row(row!["Gross revenue", format_brl(self.gross_revenue)]);
        table.add_row(row!["(-) Deductions", format_brl(self.deductions)]);
        table.add_row(row!["= Net revenue", format_brl(self.net_revenue)]);
        table.add_row(row!["(-) Cost of goods", format_brl(self.cost_of_goods)]);
        table.add_row(row!["= Gross profit", format_brl(self.gross_profit)]);
        table.add_row(row!["(-) Operating expenses", format_brl(self.operating_expenses)]);
        table.add_row(row!["= Operating result", format_brl(self.operating_result)]);
        table.add_row(row!["(-) Non-operating", format_brl(self.non_operating)]);
        table.add_row(row!["= Net profit", format_brl(self.net_profit)]);
        if let Some(margin) = self.net_margin_pct {
            table.add_row(row!["Net margin", format_percent(margin)]);
        }

        write!(f, "\n{}\n", table)
    }
}
