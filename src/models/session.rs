use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

use super::Role;

/// Login session; only the SHA-256 of the bearer token is stored
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token_hash: String,
    pub subject_id: Uuid,
    pub role: String,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Session {
    pub fn role_enum(&self) -> Option<Role> {
        Role::from_str(&self.role).ok()
    }

    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}
