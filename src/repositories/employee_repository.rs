use crate::error::RepositoryError;
use crate::models::Employee;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const EMPLOYEE_COLUMNS: &str =
    "id, name, phone, password_hash, designation, monthly_salary, active, created_at";

/// Repository for employee accounts
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        phone: &str,
        password_hash: &str,
        designation: &str,
        monthly_salary: Decimal,
    ) -> Result<Employee, RepositoryError> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees (name, phone, password_hash, designation, monthly_salary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(phone)
        .bind(password_hash)
        .bind(designation)
        .bind(monthly_salary)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, RepositoryError> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Employee>, RepositoryError> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn list(&self) -> Result<Vec<Employee>, RepositoryError> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY active DESC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE active")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Enable or disable an employee's login
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<Employee, RepositoryError> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "UPDATE employees SET active = $2 WHERE id = $1 RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Employee {} not found", id)))?;

        Ok(employee)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, RepositoryError> {
        let rows_affected = sqlx::query("UPDATE employees SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
