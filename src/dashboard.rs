use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use fluxoazul_core::{
    money::{checked, checked_sum, AmountOverflow},
    BankBalance, InventoryItem, Lead, LeadStage, Reminder, SupportTicket, Transaction, TransactionKind,
};

use crate::dre::{self, Period};

/// Everything the dashboard needs, already loaded from storage.
pub struct DashboardInputs<'a> {
    pub transactions: &'a [Transaction],
    pub bank_balances: &'a [BankBalance],
    pub inventory: &'a [InventoryItem],
    pub reminders: &'a [Reminder],
    pub tickets: &'a [SupportTicket],
    pub leads: &'a [Lead],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today: Date,
    pub bank_total: Decimal,
    pub month_revenue: Decimal,
    pub month_expenses: Decimal,
    pub month_result: Decimal,
    pub pending_receivables: Decimal,
    pub pending_payables: Decimal,
    pub low_stock_items: usize,
    pub inventory_value: Decimal,
    pub pending_reminders: usize,
    pub overdue_reminders: usize,
    pub open_tickets: usize,
    pub open_pipeline_value: Decimal,
    pub leads_by_stage: BTreeMap<LeadStage, usize>,
}

fn month_period(today: Date) -> Period {
    let first = today.replace_day(1).unwrap_or(today);
    let last = (28..=31)
        .rev()
        .find_map(|day| today.replace_day(day).ok())
        .unwrap_or(today);
    Period::new(first, last)
}

pub fn summarize(inputs: &DashboardInputs<'_>, today: Date) -> Result<DashboardSummary, AmountOverflow> {
    let month = month_period(today);
    let statement = dre::build(inputs.transactions, &month)?;
    let month_expenses = checked_sum(
        "month_expenses",
        [statement.deductions, statement.operating_expenses, statement.non_operating],
    )?;

    let unpaid = |kind: TransactionKind| {
        inputs.transactions.iter().filter(move |t| !t.paid && t.kind == kind).map(|t| t.amount)
    };
    let pending_receivables = checked_sum("pending_receivables", unpaid(TransactionKind::Revenue))?;
    let pending_payables = checked_sum("pending_payables", unpaid(TransactionKind::Expense))?;

    let inventory_value = inputs
        .inventory
        .iter()
        .try_fold(Decimal::ZERO, |total, item| checked("inventory_value", total.checked_add(item.stock_value()?)))?;

    let mut leads_by_stage: BTreeMap<LeadStage, usize> = LeadStage::ALL.iter().map(|s| (*s, 0)).collect();
    for lead in inputs.leads {
        *leads_by_stage.entry(lead.stage).or_insert(0) += 1;
    }

    Ok(DashboardSummary {
        today,
        bank_total: checked_sum("bank_total", inputs.bank_balances.iter().map(|b| b.balance))?,
        month_revenue: statement.gross_revenue,
        month_expenses,
        month_result: checked("month_result", statement.gross_revenue.checked_sub(month_expenses))?,
        pending_receivables,
        pending_payables,
        low_stock_items: inputs.inventory.iter().filter(|i| i.is_low_stock()).count(),
        inventory_value,
        pending_reminders: inputs.reminders.iter().filter(|r| !r.done).count(),
        overdue_reminders: inputs.reminders.iter().filter(|r| r.is_overdue(today)).count(),
        open_tickets: inputs.tickets.iter().filter(|t| t.is_open()).count(),
        open_pipeline_value: checked_sum(
            "open_pipeline_value",
            inputs.leads.iter().filter(|l| !l.stage.is_closed()).map(|l| l.value),
        )?,
        leads_by_stage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxoazul_core::{Category, TicketPriority, TicketStatus};
    use rust_decimal_macros::dec;
    use time::macros::date;
    use uuid::Uuid;

    #[test]
    fn test_month_period_handles_short_months() {
        assert_eq!(month_period(date!(2024 - 02 - 10)), Period::new(date!(2024 - 02 - 01), date!(2024 - 02 - 29)));
        assert_eq!(month_period(date!(2023 - 04 - 30)), Period::new(date!(2023 - 04 - 01), date!(2023 - 04 - 30)));
    }

    #[test]
    fn test_summarize() {
        let today = date!(2024 - 03 - 15);
        let mut unpaid = Transaction::new(date!(2024 - 03 - 20), "Boleto", TransactionKind::Expense, Category::Rent, dec!(1500));
        unpaid.paid = false;
        let transactions = vec![
            Transaction::new(date!(2024 - 03 - 01), "Vendas", TransactionKind::Revenue, Category::Sales, dec!(8000)),
            Transaction::new(date!(2024 - 02 - 01), "Vendas", TransactionKind::Revenue, Category::Sales, dec!(7000)),
            Transaction::new(date!(2024 - 03 - 02), "Impostos", TransactionKind::Expense, Category::SalesTaxes, dec!(480)),
            unpaid,
        ];
        let bank_balances = vec![
            BankBalance { id: Uuid::nil(), bank: "Banco A".into(), account: None, balance: dec!(12000), as_of: today },
            BankBalance { id: Uuid::nil(), bank: "Banco B".into(), account: None, balance: dec!(-200), as_of: today },
        ];
        let inventory = vec![InventoryItem {
            id: Uuid::nil(),
            name: "Farinha".into(),
            sku: None,
            quantity: dec!(2),
            unit_cost: dec!(10),
            min_quantity: dec!(5),
        }];
        let reminders = vec![
            Reminder { id: Uuid::nil(), title: "DAS".into(), due_date: date!(2024 - 03 - 10), amount: None, done: false },
            Reminder { id: Uuid::nil(), title: "Aluguel".into(), due_date: date!(2024 - 03 - 20), amount: None, done: false },
            Reminder { id: Uuid::nil(), title: "Luz".into(), due_date: date!(2024 - 03 - 01), amount: None, done: true },
        ];
        let tickets = vec![SupportTicket {
            id: Uuid::nil(),
            subject: "Erro".into(),
            message: "Falha ao exportar".into(),
            priority: TicketPriority::High,
            status: TicketStatus::InProgress,
            created_on: None,
        }];
        let leads = vec![
            Lead { id: Uuid::nil(), name: "A".into(), company: None, email: None, phone: None, value: dec!(1000), stage: LeadStage::Proposal, notes: None },
            Lead { id: Uuid::nil(), name: "B".into(), company: None, email: None, phone: None, value: dec!(500), stage: LeadStage::Won, notes: None },
        ];

        let summary = summarize(
            &DashboardInputs {
                transactions: &transactions,
                bank_balances: &bank_balances,
                inventory: &inventory,
                reminders: &reminders,
                tickets: &tickets,
                leads: &leads,
            },
            today,
        )
        .unwrap();

        assert_eq!(summary.bank_total, dec!(11800));
        assert_eq!(summary.month_revenue, dec!(8000));
        assert_eq!(summary.month_expenses, dec!(1980));
        assert_eq!(summary.month_result, dec!(6020));
        assert_eq!(summary.pending_payables, dec!(1500));
        assert_eq!(summary.pending_receivables, Decimal::ZERO);
        assert_eq!(summary.low_stock_items, 1);
        assert_eq!(summary.inventory_value, dec!(20));
        assert_eq!(summary.pending_reminders, 2);
        assert_eq!(summary.overdue_reminders, 1);
        assert_eq!(summary.open_tickets, 1);
        assert_eq!(summary.open_pipeline_value, dec!(1000));
        assert_eq!(summary.leads_by_stage[&LeadStage::Proposal], 1);
        assert_eq!(summary.leads_by_stage[&LeadStage::New], 0);
    }

    #[test]
    fn test_summarize_reports_overflow() {
        let balance = |amount| BankBalance {
            id: Uuid::nil(),
            bank: "Banco".into(),
            account: None,
            balance: amount,
            as_of: date!(2024 - 03 - 01),
        };
        let bank_balances = vec![balance(Decimal::MAX), balance(Decimal::MAX)];
        let inputs = DashboardInputs {
            transactions: &[],
            bank_balances: &bank_balances,
            inventory: &[],
            reminders: &[],
            tickets: &[],
            leads: &[],
        };
        assert_eq!(summarize(&inputs, date!(2024 - 03 - 15)), Err(AmountOverflow("bank_total")));
    }
}
