#![allow(dead_code)]

use expense_tracker::database::{Gateway, Store};
use expense_tracker::models::{CategoryDraft, ExpenseDraft};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

/// Gateway over a fresh database in its own temporary directory. Keep the
/// returned `TempDir` alive for as long as the gateway is used.
pub async fn setup_test_environment() -> (Gateway, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("expenses.db");

    let gateway = Gateway::open_path(&path);
    gateway
        .ensure_schema()
        .await
        .unwrap_or_else(|e| panic!("Failed to create schema at {}: {}", path.display(), e));

    (gateway, temp_dir)
}

pub async fn setup_test_store() -> (Store, TempDir) {
    let (gateway, temp_dir) = setup_test_environment().await;
    (Arc::new(gateway), temp_dir)
}

pub fn category_draft(name: &str, description: Option<&str>) -> CategoryDraft {
    CategoryDraft {
        name: name.to_string(),
        description: description.map(str::to_string),
    }
}

pub fn expense_draft(title: &str, amount: &str, category_id: i64) -> ExpenseDraft {
    ExpenseDraft {
        title: title.to_string(),
        description: None,
        amount: Decimal::from_str(amount).expect("Invalid test amount"),
        category_id,
    }
}

pub async fn create_test_category(gateway: &Gateway, name: &str) -> i64 {
    gateway
        .create_category(&category_draft(name, None))
        .await
        .unwrap_or_else(|e| panic!("Failed to insert test category '{}': {}", name, e))
}

pub async fn create_test_expense(
    gateway: &Gateway,
    title: &str,
    amount: &str,
    category_id: i64,
) -> i64 {
    gateway
        .create_expense(&expense_draft(title, amount, category_id))
        .await
        .unwrap_or_else(|e| panic!("Failed to insert test expense '{}': {}", title, e))
}

/// Timestamps have nanosecond resolution; a short pause guarantees distinct ones.
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
