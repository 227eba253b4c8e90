use crate::error::RepositoryError;
use crate::models::{ExpenseRecord, NewExpense};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

const EXPENSE_COLUMNS: &str = "id, category, amount, description, spent_by, spent_on, created_at";

pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: &NewExpense) -> Result<ExpenseRecord, RepositoryError> {
        let created = sqlx::query_as::<_, ExpenseRecord>(&format!(
            r#"
            INSERT INTO expenses (category, amount, description, spent_by, spent_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(&record.category)
        .bind(record.amount)
        .bind(&record.description)
        .bind(record.spent_by)
        .bind(record.spent_on)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Expenses within an optional inclusive date range
    pub async fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ExpenseRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, ExpenseRecord>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM expenses
            WHERE ($1::DATE IS NULL OR spent_on >= $1)
              AND ($2::DATE IS NULL OR spent_on <= $2)
            ORDER BY spent_on DESC, created_at DESC
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn total(&self) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM expenses")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
