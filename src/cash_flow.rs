use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Month};

use fluxoazul_core::{
    money::{checked, AmountOverflow},
    Transaction, TransactionKind,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CashFlowError {
    #[error("range start {from} is after range end {to}")]
    InvertedRange { from: Date, to: Date },
    #[error(transparent)]
    Overflow(#[from] AmountOverflow),
}

fn add(what: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    checked(what, a.checked_add(b))
}

fn sub(what: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    checked(what, a.checked_sub(b))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CashFlowMonth {
    /// `YYYY-MM`
    pub month: String,
    pub opening_balance: Decimal,
    pub inflows: Decimal,
    pub outflows: Decimal,
    pub pending_inflows: Decimal,
    pub pending_outflows: Decimal,
    pub net: Decimal,
    pub closing_balance: Decimal,
    pub projected_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowReport {
    pub from: Date,
    pub to: Date,
    pub opening_balance: Decimal,
    pub total_inflows: Decimal,
    pub total_outflows: Decimal,
    pub closing_balance: Decimal,
    pub projected_balance: Decimal,
    pub months: Vec<CashFlowMonth>,
}

type MonthKey = (i32, u8);

fn month_key(date: Date) -> MonthKey {
    (date.year(), date.month() as u8)
}

fn next_month((year, month): MonthKey) -> MonthKey {
    if month == Month::December as u8 { (year + 1, 1) } else { (year, month + 1) }
}

/// Month-by-month cash movement between `from` and `to` (inclusive).
///
/// Paid transactions move the realized balance; unpaid ones only move the
/// projected balance.
pub fn monthly(
    transactions: &[Transaction],
    opening_balance: Decimal,
    from: Date,
    to: Date,
) -> Result<CashFlowReport, CashFlowError> {
    if from > to {
        return Err(CashFlowError::InvertedRange { from, to });
    }

    let mut buckets: BTreeMap<MonthKey, CashFlowMonth> = BTreeMap::new();
    let last = month_key(to);
    let mut key = month_key(from);
    while key <= last {
        buckets.insert(key, CashFlowMonth {
            month: format!("{:04}-{:02}", key.0, key.1),
            ..Default::default()
        });
        key = next_month(key);
    }

    for txn in transactions.iter().filter(|t| t.date >= from && t.date <= to) {
        let Some(bucket) = buckets.get_mut(&month_key(txn.date)) else {
            continue;
        };
        let (total, what) = match (txn.kind, txn.paid) {
            (TransactionKind::Revenue, true) => (&mut bucket.inflows, "inflows"),
            (TransactionKind::Expense, true) => (&mut bucket.outflows, "outflows"),
            (TransactionKind::Revenue, false) => (&mut bucket.pending_inflows, "pending_inflows"),
            (TransactionKind::Expense, false) => (&mut bucket.pending_outflows, "pending_outflows"),
        };
        *total = add(what, *total, txn.amount)?;
    }

    let mut balance = opening_balance;
    let mut pending = Decimal::ZERO;
    let mut total_inflows = Decimal::ZERO;
    let mut total_outflows = Decimal::ZERO;
    let mut months = Vec::with_capacity(buckets.len());
    for (_, mut month) in buckets {
        month.opening_balance = balance;
        month.net = sub("net", month.inflows, month.outflows)?;
        balance = add("balance", balance, month.net)?;
        pending = add("pending", pending, sub("pending", month.pending_inflows, month.pending_outflows)?)?;
        month.closing_balance = balance;
        month.projected_balance = add("projected_balance", balance, pending)?;
        total_inflows = add("total_inflows", total_inflows, month.inflows)?;
        total_outflows = add("total_outflows", total_outflows, month.outflows)?;
        months.push(month);
    }
    let projected_balance = add("projected_balance", balance, pending)?;

    Ok(CashFlowReport {
        from,
        to,
        opening_balance,
        total_inflows,
        total_outflows,
        closing_balance: balance,
        projected_balance,
        months,
    })
}
