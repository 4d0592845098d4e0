use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub category_id: i64,
    /// Filled from the categories table on read; never written.
    pub category_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Caller-supplied fields of a category create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

/// Caller-supplied fields of an expense create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub category_id: i64,
}

#[derive(Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct ExpensePayload {
    pub title: String,
    pub description: Option<String>,
    /// Kept as text so malformed numbers are reported as validation errors.
    pub amount: String,
    pub category_id: i64,
}

/// One entry of the category selector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryOption {
    pub id: i64,
    pub label: String,
}

pub fn category_label(category: &Category) -> String {
    category.name.clone()
}

impl From<&Category> for CategoryOption {
    fn from(category: &Category) -> Self {
        CategoryOption {
            id: category.id,
            label: category_label(category),
        }
    }
}
