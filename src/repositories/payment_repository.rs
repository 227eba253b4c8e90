use crate::error::RepositoryError;
use crate::models::{NewPayment, PaymentRecord};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const PAYMENT_COLUMNS: &str =
    "id, group_id, member_username, amount, payment_mode, paid_by, paid_on, note, created_at";

/// Repository for payouts to members
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: &NewPayment) -> Result<PaymentRecord, RepositoryError> {
        let created = sqlx::query_as::<_, PaymentRecord>(&format!(
            r#"
            INSERT INTO payments (group_id, member_username, amount, payment_mode, paid_by, paid_on, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(record.group_id)
        .bind(&record.member_username)
        .bind(record.amount)
        .bind(record.payment_mode.as_str())
        .bind(record.paid_by)
        .bind(record.paid_on)
        .bind(&record.note)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list_all(&self) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY paid_on DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE group_id = $1 ORDER BY paid_on DESC, created_at DESC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_member(&self, username: &str) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE member_username = $1 ORDER BY paid_on DESC, created_at DESC"
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn total(&self) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM payments")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
