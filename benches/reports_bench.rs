use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fluxoazul::cash_flow;
use fluxoazul::dre::{self, Period};
use fluxoazul::repository::Repository;
use fluxoazul::storage::{InMemoryStorage, StorageBackend};
use fluxoazul_core::money::{format_brl, parse_brl};
use fluxoazul_core::{Category, Transaction, TransactionKind};
use rust_decimal::Decimal;
use time::{Date, Duration, Month};

const CATEGORIES: [Category; 6] = [
    Category::SalesTaxes,
    Category::Suppliers,
    Category::Payroll,
    Category::Rent,
    Category::FinancialExpenses,
    Category::Other,
];

fn transactions(count: usize) -> Vec<Transaction> {
    let start = Date::from_calendar_date(2023, Month::January, 1).unwrap();
    (0..count)
        .map(|i| {
            let date = start + Duration::days((i % 365) as i64);
            let amount = Decimal::new((i as i64 % 50_000) + 100, 2);
            let mut txn = if i % 3 == 0 {
                Transaction::new(date, "Venda", TransactionKind::Revenue, Category::Sales, amount * Decimal::TEN)
            } else {
                Transaction::new(date, "Despesa", TransactionKind::Expense, CATEGORIES[i % CATEGORIES.len()], amount)
            };
            txn.paid = i % 7 != 0;
            txn
        })
        .collect()
}

fn bench_dre(c: &mut Criterion) {
    let data = transactions(10_000);
    let year = Period::new(
        Date::from_calendar_date(2023, Month::January, 1).unwrap(),
        Date::from_calendar_date(2023, Month::December, 31).unwrap(),
    );

    c.bench_function("dre_build_10k", |b| {
        b.iter(|| dre::build(black_box(&data), black_box(&year)).unwrap())
    });
}

fn bench_cash_flow(c: &mut Criterion) {
    let data = transactions(10_000);
    let from = Date::from_calendar_date(2023, Month::January, 1).unwrap();
    let to = Date::from_calendar_date(2023, Month::December, 31).unwrap();

    c.bench_function("cash_flow_monthly_10k", |b| {
        b.iter(|| cash_flow::monthly(black_box(&data), Decimal::ZERO, from, to).unwrap())
    });
}

fn bench_dre_from_storage(c: &mut Criterion) {
    let storage: Arc<dyn StorageBackend> = Arc::new(InMemoryStorage::new());
    let repo: Repository<Transaction> = Repository::new(storage);
    for txn in transactions(2_000) {
        repo.create(txn).unwrap();
    }

    c.bench_function("dre_from_storage_2k", |b| {
        b.iter(|| {
            let data = repo.list().unwrap();
            dre::build(&data, &Period::default()).unwrap()
        })
    });
}

fn bench_currency(c: &mut Criterion) {
    let value = Decimal::new(123_456_789, 2);
    c.bench_function("format_brl", |b| b.iter(|| format_brl(black_box(value))));
    c.bench_function("parse_brl", |b| {
        b.iter(|| parse_brl(black_box("R$ 1.234.567,89")).unwrap())
    });
}

criterion_group!(
    benches,
    bench_dre,
    bench_cash_flow,
    bench_dre_from_storage,
    bench_currency
);
criterion_main!(benches);
