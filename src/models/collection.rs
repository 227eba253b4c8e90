use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How money changed hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Cash,
    Upi,
    Bank,
    Cheque,
}

impl PaymentMode {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "upi" => Ok(PaymentMode::Upi),
            "bank" | "neft" | "imps" => Ok(PaymentMode::Bank),
            "cheque" | "check" => Ok(PaymentMode::Cheque),
            _ => Err(format!("Invalid payment mode: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Upi => "upi",
            PaymentMode::Bank => "bank",
            PaymentMode::Cheque => "cheque",
        }
    }
}

/// Installment received from a member
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CollectionRecord {
    pub id: Uuid,
    pub receipt_no: i64,
    pub group_id: Uuid,
    pub member_username: String,
    pub amount: Decimal,
    pub payment_mode: String,
    pub collected_by: Option<Uuid>,
    pub collected_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for recording a collection
#[derive(Debug, Clone)]
pub struct NewCollection {
    pub group_id: Uuid,
    pub member_username: String,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub collected_by: Option<Uuid>,
    pub collected_on: NaiveDate,
    pub note: Option<String>,
}
