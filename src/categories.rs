use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::constants::*;
use crate::database::{Gateway, Store, from_db_timestamp, now, to_db_timestamp};
use crate::error::{PersistenceError, Result, is_foreign_key_violation};
use crate::models::{Category, CategoryDraft, CategoryOption, CategoryPayload};
use crate::utils::{normalize_description, persistence_error, validate_string_length};

const SELECT_CATEGORY_COLUMNS: &str =
    "SELECT id, name, description, created_at, updated_at FROM categories";

pub fn extract_category_from_row(row: libsql::Row) -> Result<Category> {
    let id: i64 = row
        .get(0)
        .map_err(|e| PersistenceError::mapping("id", e))?;
    let name: String = row
        .get(1)
        .map_err(|e| PersistenceError::mapping("name", e))?;
    let description: Option<String> = row
        .get(2)
        .map_err(|e| PersistenceError::mapping("description", e))?;
    let created_at: i64 = row
        .get(3)
        .map_err(|e| PersistenceError::mapping("created_at", e))?;
    let updated_at: i64 = row
        .get(4)
        .map_err(|e| PersistenceError::mapping("updated_at", e))?;

    Ok(Category {
        id,
        name,
        description,
        created_at: from_db_timestamp("created_at", created_at)?,
        updated_at: from_db_timestamp("updated_at", updated_at)?,
    })
}

impl Gateway {
    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<i64> {
        let conn = self.connect().await?;
        let timestamp = to_db_timestamp(now());

        let affected = conn
            .execute(
                "INSERT INTO categories (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
                (
                    draft.name.as_str(),
                    draft.description.as_deref(),
                    timestamp,
                    timestamp,
                ),
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::NoRowsAffected("categories"));
        }

        match conn.last_insert_rowid() {
            id if id > 0 => Ok(id),
            _ => Err(PersistenceError::MissingGeneratedId("categories")),
        }
    }

    /// Newest first; equal timestamps fall back to the higher id.
    pub async fn get_all_categories(&self) -> Result<Vec<Category>> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                &format!("{} ORDER BY created_at DESC, id DESC", SELECT_CATEGORY_COLUMNS),
                (),
            )
            .await?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await? {
            categories.push(extract_category_from_row(row)?);
        }
        Ok(categories)
    }

    pub async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(&format!("{} WHERE id = ?", SELECT_CATEGORY_COLUMNS), [id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(extract_category_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_category(&self, id: i64, draft: &CategoryDraft) -> Result<bool> {
        let conn = self.connect().await?;
        let affected = conn
            .execute(
                "UPDATE categories SET name = ?, description = ?, updated_at = MAX(created_at, ?) WHERE id = ?",
                (
                    draft.name.as_str(),
                    draft.description.as_deref(),
                    to_db_timestamp(now()),
                    id,
                ),
            )
            .await?;
        Ok(affected > 0)
    }

    /// Refuses with [`PersistenceError::CategoryInUse`] while expenses still
    /// point at the category.
    pub async fn delete_category(&self, id: i64) -> Result<bool> {
        let conn = self.connect().await?;

        let expenses = count_category_expenses(&conn, id).await?;
        if expenses > 0 {
            return Err(PersistenceError::CategoryInUse { id, expenses });
        }

        // An expense inserted after the count trips the foreign key instead
        match conn
            .execute("DELETE FROM categories WHERE id = ?", [id])
            .await
        {
            Ok(affected) => Ok(affected > 0),
            Err(e) if is_foreign_key_violation(&e) => Err(PersistenceError::CategoryInUse {
                id,
                expenses: count_category_expenses(&conn, id).await?,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

async fn count_category_expenses(conn: &libsql::Connection, id: i64) -> Result<u64> {
    let mut rows = conn
        .query("SELECT COUNT(*) FROM expenses WHERE category_id = ?", [id])
        .await?;
    let count: i64 = match rows.next().await? {
        Some(row) => row
            .get(0)
            .map_err(|e| PersistenceError::mapping("COUNT(*)", e))?,
        None => 0,
    };
    Ok(count as u64)
}

pub fn validate_category_name(name: &str) -> std::result::Result<(), (StatusCode, String)> {
    validate_string_length(name, "Category name", MAX_CATEGORY_NAME_LENGTH)
}

pub fn category_draft_from_payload(
    payload: &CategoryPayload,
) -> std::result::Result<CategoryDraft, (StatusCode, String)> {
    validate_category_name(&payload.name)?;
    Ok(CategoryDraft {
        name: payload.name.trim().to_string(),
        description: normalize_description(payload.description.as_deref())?,
    })
}

pub async fn create_category(
    State(gateway): State<Store>,
    Json(payload): Json<CategoryPayload>,
) -> std::result::Result<(StatusCode, Json<Category>), (StatusCode, String)> {
    let draft = category_draft_from_payload(&payload)?;

    let id = gateway
        .create_category(&draft)
        .await
        .map_err(|e| persistence_error("category creation failed", e))?;

    let category = gateway
        .get_category_by_id(id)
        .await
        .map_err(|e| persistence_error("failed to load created category", e))?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Created category could not be read back".to_string(),
            )
        })?;

    tracing::info!(category_id = id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_categories(
    State(gateway): State<Store>,
) -> std::result::Result<Json<Vec<Category>>, (StatusCode, String)> {
    let categories = gateway
        .get_all_categories()
        .await
        .map_err(|e| persistence_error("failed to list categories", e))?;
    Ok(Json(categories))
}

/// Selector entries for the expense form, in the same order as the list.
pub async fn get_category_options(
    State(gateway): State<Store>,
) -> std::result::Result<Json<Vec<CategoryOption>>, (StatusCode, String)> {
    let categories = gateway
        .get_all_categories()
        .await
        .map_err(|e| persistence_error("failed to list categories", e))?;
    Ok(Json(categories.iter().map(CategoryOption::from).collect()))
}

pub async fn get_category(
    State(gateway): State<Store>,
    Path(id): Path<i64>,
) -> std::result::Result<Json<Category>, (StatusCode, String)> {
    gateway
        .get_category_by_id(id)
        .await
        .map_err(|e| persistence_error("failed to load category", e))?
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, ERR_CATEGORY_NOT_FOUND.to_string()))
}

pub async fn update_category(
    State(gateway): State<Store>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPayload>,
) -> std::result::Result<Json<Category>, (StatusCode, String)> {
    let draft = category_draft_from_payload(&payload)?;

    let updated = gateway
        .update_category(id, &draft)
        .await
        .map_err(|e| persistence_error("category update failed", e))?;
    if !updated {
        return Err((StatusCode::NOT_FOUND, ERR_CATEGORY_NOT_FOUND.to_string()));
    }

    get_category(State(gateway), Path(id)).await
}

pub async fn delete_category(
    State(gateway): State<Store>,
    Path(id): Path<i64>,
) -> std::result::Result<StatusCode, (StatusCode, String)> {
    let deleted = gateway
        .delete_category(id)
        .await
        .map_err(|e| persistence_error("category deletion failed", e))?;

    if deleted {
        tracing::info!(category_id = id, "category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, ERR_CATEGORY_NOT_FOUND.to_string()))
    }
}
