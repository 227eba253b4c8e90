use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role of an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Member,
}

impl Role {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            "member" => Ok(Role::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Member => "member",
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// User account: chit members and office admins
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String, // Stored as TEXT, use Role enum for type safety
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Get role as an enum
    pub fn role_enum(&self) -> Role {
        match Role::from_str(&self.role) {
            Ok(Role::Admin) => Role::Admin,
            _ => Role::Member,
        }
    }

    /// Check if the user is an office admin
    pub fn is_admin(&self) -> bool {
        self.role_enum() == Role::Admin
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Lakshmi".to_string(),
            username: "lakshmi".to_string(),
            phone: "+919876543210".to_string(),
            password_hash: "sha256$00$00".to_string(),
            role: role.to_string(),
            address: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Employee, Role::Member] {
            assert_eq!(Role::from_str(role.as_str()), Ok(role));
        }
        assert!(Role::from_str("owner").is_err());
    }

    #[test]
    fn test_user_role_never_employee() {
        assert!(user("admin").is_admin());
        assert_eq!(user("member").role_enum(), Role::Member);
        // Employees live in their own table
        assert_eq!(user("employee").role_enum(), Role::Member);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user("member")).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "lakshmi");
    }
}
