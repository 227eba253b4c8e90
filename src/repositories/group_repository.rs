use crate::error::RepositoryError;
use crate::models::{Group, GroupStatus, NewGroup};
use sqlx::PgPool;
use uuid::Uuid;

const GROUP_COLUMNS: &str = "id, name, total_amount, monthly_installment, duration_months, \
                             start_date, members, status, created_at";

/// Repository for chit groups
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new GroupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new group
    pub async fn create(&self, group: &NewGroup) -> Result<Group, RepositoryError> {
        let created = sqlx::query_as::<_, Group>(&format!(
            r#"
            INSERT INTO chit_groups
                (name, total_amount, monthly_installment, duration_months, start_date, members)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&group.name)
        .bind(group.total_amount)
        .bind(group.monthly_installment)
        .bind(group.duration_months)
        .bind(group.start_date)
        .bind(&group.members)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Find a group by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepositoryError> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM chit_groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// All groups, newest first
    pub async fn list(&self) -> Result<Vec<Group>, RepositoryError> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM chit_groups ORDER BY start_date DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// Groups whose member list contains `username`
    pub async fn list_for_member(&self, username: &str) -> Result<Vec<Group>, RepositoryError> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            r#"
            SELECT {GROUP_COLUMNS} FROM chit_groups
            WHERE $1 = ANY(members)
            ORDER BY start_date DESC, created_at DESC
            "#
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// Append a member; a no-op if already present
    pub async fn add_member(&self, id: Uuid, username: &str) -> Result<Group, RepositoryError> {
        let group = sqlx::query_as::<_, Group>(&format!(
            r#"
            UPDATE chit_groups
            SET members = CASE
                WHEN $2 = ANY(members) THEN members
                ELSE array_append(members, $2)
            END
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Group {} not found", id)))?;

        Ok(group)
    }

    /// Remove a member from the group's member list
    pub async fn remove_member(&self, id: Uuid, username: &str) -> Result<Group, RepositoryError> {
        let group = sqlx::query_as::<_, Group>(&format!(
            r#"
            UPDATE chit_groups
            SET members = array_remove(members, $2)
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Group {} not found", id)))?;

        Ok(group)
    }

    /// Update group status
    pub async fn set_status(&self, id: Uuid, status: GroupStatus) -> Result<Group, RepositoryError> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "UPDATE chit_groups SET status = $2 WHERE id = $1 RETURNING {GROUP_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Group {} not found", id)))?;

        Ok(group)
    }
}
