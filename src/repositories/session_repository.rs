use crate::error::RepositoryError;
use crate::models::{Role, Session};
use chrono::NaiveDateTime;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for login sessions
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        token_hash: &str,
        subject_id: Uuid,
        role: Role,
        expires_at: NaiveDateTime,
    ) -> Result<Session, RepositoryError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, subject_id, role, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING token_hash, subject_id, role, expires_at, created_at
            "#,
        )
        .bind(token_hash)
        .bind(subject_id)
        .bind(role.as_str())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Unexpired session for a token hash
    pub async fn find_valid(
        &self,
        token_hash: &str,
        now: NaiveDateTime,
    ) -> Result<Option<Session>, RepositoryError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token_hash, subject_id, role, expires_at, created_at
            FROM sessions
            WHERE token_hash = $1 AND expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn delete(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let rows_affected = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Drop every session of one subject (password change, deactivation)
    pub async fn delete_for_subject(&self, subject_id: Uuid) -> Result<u64, RepositoryError> {
        let rows_affected = sqlx::query("DELETE FROM sessions WHERE subject_id = $1")
            .bind(subject_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub async fn purge_expired(&self, now: NaiveDateTime) -> Result<u64, RepositoryError> {
        let rows_affected = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
