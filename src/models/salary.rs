use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalaryRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub salary_month: String, // YYYY-MM
    pub paid_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSalary {
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub salary_month: String,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
}

/// Check a `YYYY-MM` salary month
pub fn is_valid_salary_month(month: &str) -> bool {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d").is_ok()
        && month.trim().len() == 7
}
