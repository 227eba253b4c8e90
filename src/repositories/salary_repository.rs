use crate::error::RepositoryError;
use crate::models::{NewSalary, SalaryRecord};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const SALARY_COLUMNS: &str = "id, employee_id, amount, salary_month, paid_on, note, created_at";

pub struct SalaryRepository {
    pool: PgPool,
}

impl SalaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: &NewSalary) -> Result<SalaryRecord, RepositoryError> {
        let created = sqlx::query_as::<_, SalaryRecord>(&format!(
            r#"
            INSERT INTO salaries (employee_id, amount, salary_month, paid_on, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SALARY_COLUMNS}
            "#
        ))
        .bind(record.employee_id)
        .bind(record.amount)
        .bind(&record.salary_month)
        .bind(record.paid_on)
        .bind(&record.note)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list_all(&self) -> Result<Vec<SalaryRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, SalaryRecord>(&format!(
            "SELECT {SALARY_COLUMNS} FROM salaries ORDER BY paid_on DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_employee(&self, employee_id: Uuid) -> Result<Vec<SalaryRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, SalaryRecord>(&format!(
            "SELECT {SALARY_COLUMNS} FROM salaries WHERE employee_id = $1 ORDER BY paid_on DESC, created_at DESC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn total(&self) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM salaries")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
