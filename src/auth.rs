use crate::error::{AppError, AppResult};
use crate::models::Role;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const HASH_SCHEME: &str = "sha256";

/// Well-formed hash no password matches; checked when a phone number is
/// unknown so that path costs the same digest as a wrong password
pub const DUMMY_PASSWORD_HASH: &str =
    "sha256$5c1e0d4a9b7f2e6130c8a4d27f9b1e05$b592c37abaea140133b37806912589cfea3eed96787686ec083f6ebea9e8d9b4";

/// Authenticated caller, resolved from a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: Uuid,
    pub role: Role,
    pub name: String,
    /// Set for members and admins; employees have no username
    pub username: Option<String>,
}

impl Principal {
    /// Fail with `Forbidden` unless the principal holds one of `roles`
    pub fn require(&self, roles: &[Role]) -> AppResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} role may not perform this action",
                self.role.as_str()
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins see everything, members only their own records
    pub fn can_view_member(&self, username: &str) -> bool {
        match self.role {
            Role::Admin | Role::Employee => true,
            Role::Member => self.username.as_deref() == Some(username),
        }
    }

    /// Admins see every employee, employees only themselves
    pub fn can_view_employee(&self, employee_id: Uuid) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Employee => self.subject_id == employee_id,
            Role::Member => false,
        }
    }
}

fn sha256(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// Hash a password with a fresh random salt.
///
/// Output format: `sha256$<salt-hex>$<digest-hex>`
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4();
    hash_with_salt(password, salt.as_bytes())
}

fn hash_with_salt(password: &str, salt: &[u8]) -> String {
    let digest = sha256(&[salt, password.as_bytes()]);
    format!("{}${}${}", HASH_SCHEME, hex::encode(salt), hex::encode(digest))
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt_hex), Some(digest_hex)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    let actual = sha256(&[salt.as_slice(), password.as_bytes()]);
    constant_time_eq(&actual, &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Create a new opaque bearer token (64 hex chars)
pub fn generate_session_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Only this digest of a token is persisted
pub fn hash_session_token(token: &str) -> String {
    hex::encode(sha256(&[token.as_bytes()]))
}

/// Pull the token out of an `authorization` header value
pub fn parse_bearer(header: &str) -> AppResult<&str> {
    let token = header
        .trim()
        .strip_prefix("Bearer ")
        .or_else(|| header.trim().strip_prefix("bearer "))
        .map(str::trim)
        .unwrap_or("");

    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing bearer token".to_string()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_hash_is_well_formed_and_never_matches() {
        let parts: Vec<&str> = DUMMY_PASSWORD_HASH.split('$').collect();
        assert_eq!(parts[0], HASH_SCHEME);
        assert_eq!(hex::decode(parts[1]).unwrap().len(), 16);
        assert_eq!(hex::decode(parts[2]).unwrap().len(), 32);

        assert!(!verify_password("", DUMMY_PASSWORD_HASH));
        assert!(!verify_password("secret123", DUMMY_PASSWORD_HASH));
    }

    fn principal(role: Role, username: Option<&str>) -> Principal {
        Principal {
            subject_id: Uuid::new_v4(),
            role,
            name: "Test".to_string(),
            username: username.map(str::to_string),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let stored = hash_password("secret-123");
        assert!(stored.starts_with("sha256$"));
        assert!(verify_password("secret-123", &stored));
        assert!(!verify_password("secret-124", &stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("x", "plaintext"));
        assert!(!verify_password("x", "md5$00$00"));
        assert!(!verify_password("x", "sha256$zz$00"));
    }

    #[test]
    fn test_known_digest() {
        let stored = hash_with_salt("abc", b"");
        assert_eq!(
            stored,
            "sha256$$ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_session_tokens() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hash_session_token(&a), hash_session_token(&a));
        assert_ne!(hash_session_token(&a), a);
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc").unwrap(), "abc");
        assert_eq!(parse_bearer("  bearer  abc ").unwrap(), "abc");
        assert!(parse_bearer("Basic abc").is_err());
        assert!(parse_bearer("Bearer ").is_err());
    }

    #[test]
    fn test_role_gate() {
        let member = principal(Role::Member, Some("anil"));
        assert!(member.require(&[Role::Admin]).is_err());
        assert!(member.require(&[Role::Admin, Role::Member]).is_ok());
        assert!(member.can_view_member("anil"));
        assert!(!member.can_view_member("bina"));
        assert!(!member.can_view_employee(member.subject_id));

        let employee = principal(Role::Employee, None);
        assert!(employee.can_view_employee(employee.subject_id));
        assert!(!employee.can_view_employee(Uuid::new_v4()));
        assert!(employee.can_view_member("anyone"));
    }
}
