use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;
use std::hint::black_box;
use tempfile::tempdir;
use tokio::runtime::Runtime;

use expense_tracker::database::Gateway;
use expense_tracker::models::{CategoryDraft, ExpenseDraft};

// Benchmark constants
const BENCH_EXPENSE_COUNT: usize = 1000;
const BENCH_CATEGORY_COUNT: usize = 10;

async fn setup_benchmark_environment() -> (Gateway, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let gateway = Gateway::open_path(temp_dir.path().join("bench.db"));
    gateway.ensure_schema().await.unwrap();

    (gateway, temp_dir)
}

async fn create_benchmark_expenses(gateway: &Gateway, count: usize) {
    let mut category_ids = Vec::with_capacity(BENCH_CATEGORY_COUNT);
    for i in 0..BENCH_CATEGORY_COUNT {
        let draft = CategoryDraft {
            name: format!("Category {}", i),
            description: None,
        };
        category_ids.push(gateway.create_category(&draft).await.unwrap());
    }

    for i in 0..count {
        let draft = ExpenseDraft {
            title: format!("Benchmark Expense {}", i),
            description: None,
            amount: Decimal::new(1000 + (i % 100) as i64 * 25, 2),
            category_id: category_ids[i % BENCH_CATEGORY_COUNT],
        };
        gateway.create_expense(&draft).await.unwrap();
    }
}

async fn benchmark_get_all_expenses(gateway: &Gateway) {
    let expenses = gateway.get_all_expenses().await.unwrap();
    black_box(expenses.len());
}

async fn benchmark_get_expense_by_id(gateway: &Gateway) {
    let expense = gateway
        .get_expense_by_id((BENCH_EXPENSE_COUNT / 2) as i64)
        .await
        .unwrap();
    black_box(expense);
}

fn criterion_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    // Setup benchmark data once
    let (gateway, _temp_dir) = rt.block_on(setup_benchmark_environment());
    rt.block_on(create_benchmark_expenses(&gateway, BENCH_EXPENSE_COUNT));

    c.bench_function("get_all_expenses", |b| {
        b.to_async(&rt).iter(|| benchmark_get_all_expenses(&gateway))
    });

    c.bench_function("get_expense_by_id", |b| {
        b.to_async(&rt).iter(|| benchmark_get_expense_by_id(&gateway))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
