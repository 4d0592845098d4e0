use axum::http::StatusCode;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::constants::*;
use crate::database::Gateway;
use crate::error::PersistenceError;

/// Logs a gateway failure and turns it into a user-facing response.
pub fn persistence_error(context: &str, err: PersistenceError) -> (StatusCode, String) {
    match err {
        PersistenceError::CategoryInUse { id, expenses } => {
            tracing::info!(category_id = id, expenses, "{}", ERR_CATEGORY_IN_USE);
            (StatusCode::CONFLICT, ERR_CATEGORY_IN_USE.to_string())
        }
        other => {
            tracing::error!(error = %other, "{}", context);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", context),
            )
        }
    }
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be empty", field_name),
        ));
    }
    if value.trim().chars().count() > max_length {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be less than {} characters", field_name, max_length),
        ));
    }
    Ok(())
}

/// Blank descriptions are stored as NULL.
pub fn normalize_description(
    description: Option<&str>,
) -> Result<Option<String>, (StatusCode, String)> {
    match description.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Description must be less than {} characters",
                MAX_DESCRIPTION_LENGTH
            ),
        )),
        Some(text) => Ok(Some(text.to_string())),
    }
}

pub fn parse_amount(raw: &str) -> Result<Decimal, (StatusCode, String)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Amount cannot be empty".to_string(),
        ));
    }
    let invalid = || {
        (
            StatusCode::BAD_REQUEST,
            format!("Amount is not a valid number: {}", raw),
        )
    };
    if !is_plain_decimal(raw) {
        return Err(invalid());
    }
    let amount = Decimal::from_str(raw).map_err(|_| invalid())?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Amount cannot be negative".to_string(),
        ));
    }
    // Trailing zeros do not count as decimal places
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Amount cannot have more than {} decimal places",
                MAX_AMOUNT_SCALE
            ),
        ));
    }
    Ok(amount)
}

/// Optional minus, digits, then optionally a dot followed by digits.
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.is_none_or(all_digits)
}

pub async fn validate_category_exists(
    gateway: &Gateway,
    category_id: i64,
) -> Result<(), (StatusCode, String)> {
    let category = gateway
        .get_category_by_id(category_id)
        .await
        .map_err(|e| persistence_error("failed to check category existence", e))?;

    if category.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            ERR_CATEGORY_DOES_NOT_EXIST.to_string(),
        ));
    }
    Ok(())
}
