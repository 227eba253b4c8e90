use crate::error::RepositoryError;
use crate::models::{CollectionRecord, NewCollection};
use crate::repositories::counter_repository::{CounterRepository, RECEIPT_COUNTER};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const COLLECTION_COLUMNS: &str = "id, receipt_no, group_id, member_username, amount, payment_mode, \
                                  collected_by, collected_on, note, created_at";

/// Repository for installments received from members
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a collection with the next receipt number, atomically
    pub async fn create(&self, record: &NewCollection) -> Result<CollectionRecord, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let receipt_no = CounterRepository::next_in(&mut *tx, RECEIPT_COUNTER).await?;

        let created = sqlx::query_as::<_, CollectionRecord>(&format!(
            r#"
            INSERT INTO collections
                (receipt_no, group_id, member_username, amount, payment_mode, collected_by, collected_on, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(receipt_no)
        .bind(record.group_id)
        .bind(&record.member_username)
        .bind(record.amount)
        .bind(record.payment_mode.as_str())
        .bind(record.collected_by)
        .bind(record.collected_on)
        .bind(&record.note)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    pub async fn find_by_receipt(&self, receipt_no: i64) -> Result<Option<CollectionRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, CollectionRecord>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE receipt_no = $1"
        ))
        .bind(receipt_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_all(&self) -> Result<Vec<CollectionRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, CollectionRecord>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections ORDER BY collected_on DESC, receipt_no DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<CollectionRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, CollectionRecord>(&format!(
            r#"
            SELECT {COLLECTION_COLUMNS} FROM collections
            WHERE group_id = $1
            ORDER BY collected_on DESC, receipt_no DESC
            "#
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_member(&self, username: &str) -> Result<Vec<CollectionRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, CollectionRecord>(&format!(
            r#"
            SELECT {COLLECTION_COLUMNS} FROM collections
            WHERE member_username = $1
            ORDER BY collected_on DESC, receipt_no DESC
            "#
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_collector(&self, employee_id: Uuid) -> Result<Vec<CollectionRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, CollectionRecord>(&format!(
            r#"
            SELECT {COLLECTION_COLUMNS} FROM collections
            WHERE collected_by = $1
            ORDER BY collected_on DESC, receipt_no DESC
            "#
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Sum collected for one group
    pub async fn total_by_group(&self, group_id: Uuid) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM collections WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Sum of every collection
    pub async fn total(&self) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM collections")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
