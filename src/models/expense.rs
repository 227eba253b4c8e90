use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Office expense (rent, travel, stationery, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub description: String,
    pub spent_by: Option<Uuid>,
    pub spent_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub amount: Decimal,
    pub description: String,
    pub spent_by: Option<Uuid>,
    pub spent_on: NaiveDate,
}
