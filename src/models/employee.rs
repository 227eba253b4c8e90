use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Field staff who collect installments and handle office cash
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub designation: String,
    pub monthly_salary: Decimal,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Input for creating an employee
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub phone: String,
    pub password: String,
    pub designation: String,
    pub monthly_salary: Decimal,
}
