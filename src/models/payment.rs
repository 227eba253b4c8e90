use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::PaymentMode;

/// Money paid out to a member, typically an auction payout
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub group_id: Uuid,
    pub member_username: String,
    pub amount: Decimal,
    pub payment_mode: String,
    pub paid_by: Option<Uuid>,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for recording a payout
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub group_id: Uuid,
    pub member_username: String,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub paid_by: Option<Uuid>,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
}
