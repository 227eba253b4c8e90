use crate::error::RepositoryError;
use sqlx::PgConnection;

/// Name of the counter that numbers collection receipts
pub const RECEIPT_COUNTER: &str = "receipt";

/// Monotonic named counters
pub struct CounterRepository;

impl CounterRepository {
    /// Increment `name` and return the new value.
    ///
    /// Runs on the caller's connection so the number is only consumed if the
    /// surrounding transaction commits. The row lock taken by the upsert
    /// serializes concurrent callers.
    pub async fn next_in(conn: &mut PgConnection, name: &str) -> Result<i64, RepositoryError> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO counters (name, value)
            VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_one(conn)
        .await?;

        Ok(value)
    }
}
