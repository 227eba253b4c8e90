use chrono::{Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a chit group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Active,
    Closed,
}

impl GroupStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(GroupStatus::Active),
            "closed" => Ok(GroupStatus::Closed),
            _ => Err(format!("Invalid group status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Active => "active",
            GroupStatus::Closed => "closed",
        }
    }
}

/// A chit group. `members` holds usernames, not user ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub total_amount: Decimal,
    pub monthly_installment: Decimal,
    pub duration_months: i32,
    pub start_date: NaiveDate,
    pub members: Vec<String>,
    pub status: String, // Stored as TEXT, use GroupStatus enum for type safety
    pub created_at: NaiveDateTime,
}

impl Group {
    /// Get status as an enum
    pub fn status_enum(&self) -> GroupStatus {
        GroupStatus::from_str(&self.status).unwrap_or(GroupStatus::Active)
    }

    /// Date of the `k`-th installment (0-based)
    fn installment_date(&self, k: u32) -> Option<NaiveDate> {
        self.start_date.checked_add_months(Months::new(k))
    }

    /// First day after the last installment period
    pub fn end_date(&self) -> NaiveDate {
        self.installment_date(self.duration_months.max(0) as u32)
            .unwrap_or(NaiveDate::MAX)
    }

    /// Closed explicitly, or its term has run out
    pub fn is_closed_on(&self, today: NaiveDate) -> bool {
        self.status_enum() == GroupStatus::Closed || self.end_date() <= today
    }

    /// Installments that have fallen due on or before `today`
    pub fn installments_due(&self, today: NaiveDate) -> u32 {
        let duration = self.duration_months.max(0) as u32;
        (0..duration)
            .take_while(|k| {
                self.installment_date(*k)
                    .map(|due| due <= today)
                    .unwrap_or(false)
            })
            .count() as u32
    }

    /// Amount the group should have collected from all members by `today`
    pub fn expected_collection_to(&self, today: NaiveDate) -> Decimal {
        self.monthly_installment
            * Decimal::from(self.members.len() as u64)
            * Decimal::from(self.installments_due(today))
    }

    pub fn has_member(&self, username: &str) -> bool {
        self.members.iter().any(|m| m == username)
    }
}

/// Input for creating a group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub total_amount: Decimal,
    pub monthly_installment: Decimal,
    pub duration_months: i32,
    pub start_date: NaiveDate,
    pub members: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn group(start: NaiveDate, months: i32, status: &str) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "Diwali 2024".to_string(),
            total_amount: Decimal::new(100_000, 0),
            monthly_installment: Decimal::new(5_000, 0),
            duration_months: months,
            start_date: start,
            members: vec!["anil".into(), "bina".into()],
            status: status.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_end_date_adds_duration() {
        let g = group(date(2024, 1, 31), 3, "active");
        // chrono clamps to the last day of the month
        assert_eq!(g.end_date(), date(2024, 4, 30));
    }

    #[test]
    fn test_closed_by_status_or_term() {
        let g = group(date(2024, 1, 10), 12, "active");
        assert!(!g.is_closed_on(date(2024, 6, 1)));
        assert!(g.is_closed_on(date(2025, 1, 10)));

        let closed = group(date(2024, 1, 10), 12, "closed");
        assert!(closed.is_closed_on(date(2024, 2, 1)));
    }

    #[test]
    fn test_installments_due() {
        let g = group(date(2024, 1, 10), 12, "active");
        assert_eq!(g.installments_due(date(2024, 1, 9)), 0);
        assert_eq!(g.installments_due(date(2024, 1, 10)), 1);
        assert_eq!(g.installments_due(date(2024, 3, 9)), 2);
        assert_eq!(g.installments_due(date(2024, 3, 10)), 3);
        assert_eq!(g.installments_due(date(2030, 1, 1)), 12);
    }

    #[test]
    fn test_expected_collection() {
        let g = group(date(2024, 1, 10), 12, "active");
        // 2 members x 5000 x 3 installments
        assert_eq!(
            g.expected_collection_to(date(2024, 3, 15)),
            Decimal::new(30_000, 0)
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(GroupStatus::from_str("CLOSED"), Ok(GroupStatus::Closed));
        assert!(GroupStatus::from_str("paused").is_err());
    }
}
