use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::constants::*;
use crate::database::{Gateway, Store, from_db_timestamp, now, to_db_timestamp};
use crate::error::{PersistenceError, Result};
use crate::models::{Expense, ExpenseDraft, ExpensePayload};
use crate::utils::{
    normalize_description, parse_amount, persistence_error, validate_category_exists,
    validate_string_length,
};

// LEFT JOIN so an expense whose category row is gone still maps, with no name
const SELECT_EXPENSE_COLUMNS: &str = r#"
SELECT e.id, e.title, e.description, e.amount, e.category_id, c.name, e.created_at, e.updated_at
FROM expenses e
LEFT JOIN categories c ON c.id = e.category_id
"#;

pub fn extract_expense_from_row(row: libsql::Row) -> Result<Expense> {
    let id: i64 = row
        .get(0)
        .map_err(|e| PersistenceError::mapping("id", e))?;
    let title: String = row
        .get(1)
        .map_err(|e| PersistenceError::mapping("title", e))?;
    let description: Option<String> = row
        .get(2)
        .map_err(|e| PersistenceError::mapping("description", e))?;
    let amount: String = row
        .get(3)
        .map_err(|e| PersistenceError::mapping("amount", e))?;
    let category_id: i64 = row
        .get(4)
        .map_err(|e| PersistenceError::mapping("category_id", e))?;
    let category_name: Option<String> = row
        .get(5)
        .map_err(|e| PersistenceError::mapping("category_name", e))?;
    let created_at: i64 = row
        .get(6)
        .map_err(|e| PersistenceError::mapping("created_at", e))?;
    let updated_at: i64 = row
        .get(7)
        .map_err(|e| PersistenceError::mapping("updated_at", e))?;

    let amount = Decimal::from_str(&amount).map_err(|e| PersistenceError::mapping("amount", e))?;

    Ok(Expense {
        id,
        title,
        description,
        amount,
        category_id,
        category_name,
        created_at: from_db_timestamp("created_at", created_at)?,
        updated_at: from_db_timestamp("updated_at", updated_at)?,
    })
}

impl Gateway {
    pub async fn create_expense(&self, draft: &ExpenseDraft) -> Result<i64> {
        let conn = self.connect().await?;
        let timestamp = to_db_timestamp(now());

        let affected = conn
            .execute(
                "INSERT INTO expenses (title, description, amount, category_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
                (
                    draft.title.as_str(),
                    draft.description.as_deref(),
                    draft.amount.to_string(),
                    draft.category_id,
                    timestamp,
                    timestamp,
                ),
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::NoRowsAffected("expenses"));
        }

        match conn.last_insert_rowid() {
            id if id > 0 => Ok(id),
            _ => Err(PersistenceError::MissingGeneratedId("expenses")),
        }
    }

    /// Newest first, each joined with its category name.
    pub async fn get_all_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                &format!(
                    "{} ORDER BY e.created_at DESC, e.id DESC",
                    SELECT_EXPENSE_COLUMNS
                ),
                (),
            )
            .await?;

        let mut expenses = Vec::new();
        while let Some(row) = rows.next().await? {
            expenses.push(extract_expense_from_row(row)?);
        }
        Ok(expenses)
    }

    pub async fn get_expense_by_id(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(&format!("{} WHERE e.id = ?", SELECT_EXPENSE_COLUMNS), [id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(extract_expense_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_expense(&self, id: i64, draft: &ExpenseDraft) -> Result<bool> {
        let conn = self.connect().await?;
        let affected = conn
            .execute(
                "UPDATE expenses SET title = ?, description = ?, amount = ?, category_id = ?, updated_at = MAX(created_at, ?) WHERE id = ?",
                (
                    draft.title.as_str(),
                    draft.description.as_deref(),
                    draft.amount.to_string(),
                    draft.category_id,
                    to_db_timestamp(now()),
                    id,
                ),
            )
            .await?;
        Ok(affected > 0)
    }

    pub async fn delete_expense(&self, id: i64) -> Result<bool> {
        let conn = self.connect().await?;
        let affected = conn
            .execute("DELETE FROM expenses WHERE id = ?", [id])
            .await?;
        Ok(affected > 0)
    }
}

pub fn validate_expense_title(title: &str) -> std::result::Result<(), (StatusCode, String)> {
    validate_string_length(title, "Expense title", MAX_EXPENSE_TITLE_LENGTH)
}

/// Checks everything that does not need the store.
pub fn expense_draft_from_payload(
    payload: &ExpensePayload,
) -> std::result::Result<ExpenseDraft, (StatusCode, String)> {
    validate_expense_title(&payload.title)?;
    let amount = parse_amount(&payload.amount)?;
    Ok(ExpenseDraft {
        title: payload.title.trim().to_string(),
        description: normalize_description(payload.description.as_deref())?,
        amount,
        category_id: payload.category_id,
    })
}

pub async fn create_expense(
    State(gateway): State<Store>,
    Json(payload): Json<ExpensePayload>,
) -> std::result::Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    let draft = expense_draft_from_payload(&payload)?;
    validate_category_exists(&gateway, draft.category_id).await?;

    let id = gateway
        .create_expense(&draft)
        .await
        .map_err(|e| persistence_error("expense creation failed", e))?;

    let expense = gateway
        .get_expense_by_id(id)
        .await
        .map_err(|e| persistence_error("failed to load created expense", e))?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Created expense could not be read back".to_string(),
            )
        })?;

    tracing::info!(expense_id = id, category_id = draft.category_id, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn get_expenses(
    State(gateway): State<Store>,
) -> std::result::Result<Json<Vec<Expense>>, (StatusCode, String)> {
    let expenses = gateway
        .get_all_expenses()
        .await
        .map_err(|e| persistence_error("failed to list expenses", e))?;
    Ok(Json(expenses))
}

pub async fn get_expense(
    State(gateway): State<Store>,
    Path(id): Path<i64>,
) -> std::result::Result<Json<Expense>, (StatusCode, String)> {
    gateway
        .get_expense_by_id(id)
        .await
        .map_err(|e| persistence_error("failed to load expense", e))?
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, ERR_EXPENSE_NOT_FOUND.to_string()))
}

pub async fn update_expense(
    State(gateway): State<Store>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpensePayload>,
) -> std::result::Result<Json<Expense>, (StatusCode, String)> {
    let draft = expense_draft_from_payload(&payload)?;
    validate_category_exists(&gateway, draft.category_id).await?;

    let updated = gateway
        .update_expense(id, &draft)
        .await
        .map_err(|e| persistence_error("expense update failed", e))?;
    if !updated {
        return Err((StatusCode::NOT_FOUND, ERR_EXPENSE_NOT_FOUND.to_string()));
    }

    get_expense(State(gateway), Path(id)).await
}

pub async fn delete_expense(
    State(gateway): State<Store>,
    Path(id): Path<i64>,
) -> std::result::Result<StatusCode, (StatusCode, String)> {
    let deleted = gateway
        .delete_expense(id)
        .await
        .map_err(|e| persistence_error("expense deletion failed", e))?;

    if deleted {
        tracing::info!(expense_id = id, "expense deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, ERR_EXPENSE_NOT_FOUND.to_string()))
    }
}
