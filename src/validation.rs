//! Field-level checks applied before any record is written.

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_GROUP_DURATION_MONTHS: i32 = 120;

/// Trimmed, non-empty text
pub fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trimmed text, `None` when blank
pub fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Lowercase `[a-z0-9_.]{3,32}`
pub fn username(value: &str) -> AppResult<String> {
    let name = value.trim().to_lowercase();
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if !(3..=32).contains(&name.len()) || !valid_chars {
        return Err(AppError::Validation(format!(
            "Invalid username {:?}: use 3-32 lowercase letters, digits, '_' or '.'",
            value
        )));
    }
    Ok(name)
}

pub fn password(value: &str) -> AppResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn duration_months(value: i32) -> AppResult<i32> {
    if !(1..=MAX_GROUP_DURATION_MONTHS).contains(&value) {
        return Err(AppError::Validation(format!(
            "Duration must be between 1 and {} months",
            MAX_GROUP_DURATION_MONTHS
        )));
    }
    Ok(value)
}

/// Normalized, de-duplicated member list; duplicates are an error
pub fn member_list(values: &[String]) -> AppResult<Vec<String>> {
    let mut members: Vec<String> = Vec::with_capacity(values.len());
    for raw in values {
        let name = username(raw)?;
        if members.contains(&name) {
            return Err(AppError::Validation(format!("Duplicate member: {}", name)));
        }
        members.push(name);
    }
    Ok(members)
}
