use crate::error::RepositoryError;
use crate::models::{CreditRecord, CreditTotals, NewCredit};
use sqlx::PgPool;
use uuid::Uuid;

const CREDIT_COLUMNS: &str = "id, employee_id, amount, direction, note, credited_on, created_at";

/// Repository for cash handed between office and employees
pub struct CreditRepository {
    pool: PgPool,
}

impl CreditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: &NewCredit) -> Result<CreditRecord, RepositoryError> {
        let created = sqlx::query_as::<_, CreditRecord>(&format!(
            r#"
            INSERT INTO credits (employee_id, amount, direction, note, credited_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CREDIT_COLUMNS}
            "#
        ))
        .bind(record.employee_id)
        .bind(record.amount)
        .bind(record.direction.as_str())
        .bind(&record.note)
        .bind(record.credited_on)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list_all(&self) -> Result<Vec<CreditRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, CreditRecord>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits ORDER BY credited_on DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_employee(&self, employee_id: Uuid) -> Result<Vec<CreditRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, CreditRecord>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits WHERE employee_id = $1 ORDER BY credited_on DESC, created_at DESC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Received and sent totals for one employee
    pub async fn totals_by_employee(&self, employee_id: Uuid) -> Result<CreditTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, CreditTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE direction = 'received'), 0) AS received,
                COALESCE(SUM(amount) FILTER (WHERE direction = 'sent'), 0) AS sent
            FROM credits
            WHERE employee_id = $1
            "#,
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}
