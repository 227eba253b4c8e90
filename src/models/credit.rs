use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Direction of a cash movement, from the employee's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditDirection {
    Received,
    Sent,
}

impl CreditDirection {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "received" => Ok(CreditDirection::Received),
            "sent" => Ok(CreditDirection::Sent),
            _ => Err(format!("Invalid credit direction: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditDirection::Received => "received",
            CreditDirection::Sent => "sent",
        }
    }
}

/// Cash handed between the office and an employee
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CreditRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub direction: String,
    pub note: Option<String>,
    pub credited_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl CreditRecord {
    pub fn direction_enum(&self) -> Option<CreditDirection> {
        CreditDirection::from_str(&self.direction).ok()
    }
}

#[derive(Debug, Clone)]
pub struct NewCredit {
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub direction: CreditDirection,
    pub note: Option<String>,
    pub credited_on: NaiveDate,
}

/// Sum of received and sent amounts for one employee
#[derive(Debug, Clone, Default, FromRow)]
pub struct CreditTotals {
    pub received: Decimal,
    pub sent: Decimal,
}

impl CreditTotals {
    pub fn balance(&self) -> Decimal {
        self.received - self.sent
    }
}
