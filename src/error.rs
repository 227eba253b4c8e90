use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Errors surfaced by services and mapped to gRPC status codes at the edge
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad field value supplied by the caller
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Missing, expired or wrong credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Signed in, but the role may not do this
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Chit rule broken, e.g. collecting on a closed group
    #[error("Business logic error: {0}")]
    BusinessLogic(String),

    /// Messaging provider failure
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Audit trail error: {0}")]
    Audit(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("Invalid amount: {0}")]
    InvalidDecimal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Caller-fixable errors, as opposed to faults on our side
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound(_)
                | AppError::Unauthorized(_)
                | AppError::Forbidden(_)
                | AppError::BusinessLogic(_)
                | AppError::InvalidUuid(_)
                | AppError::InvalidDecimal(_)
        )
    }
}

/// Errors raised by the repositories
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Query error: {0}")]
    Query(SqlxError),

    #[error("Record not found")]
    NotFound(String),

    /// Unique key already taken (username, phone, group name)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// e.g. an auction month already held
    #[error("Business rule violation: {0}")]
    BusinessRule(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::Duplicate(msg) => AppError::BusinessLogic(format!("Duplicate: {}", msg)),
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::BusinessRule(msg) => AppError::BusinessLogic(msg),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // unique_violation
                    Some("23505") => RepositoryError::Duplicate(db_err.message().to_string()),
                    // foreign_key_violation, check_violation, numeric_value_out_of_range
                    Some("23503") | Some("23514") | Some("22003") => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(AppError::NotFound("group".into()).is_client_error());
        assert!(AppError::Forbidden("role".into()).is_client_error());
        assert!(AppError::BusinessLogic("closed".into()).is_client_error());
        assert!(!AppError::ExternalService("twilio".into()).is_client_error());
        assert!(!AppError::Audit("disk full".into()).is_client_error());
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: AppError = RepositoryError::NotFound("Group not found".into()).into();
        assert!(err.is_not_found());

        let err: AppError = RepositoryError::Duplicate("users_phone_key".into()).into();
        assert!(matches!(err, AppError::BusinessLogic(_)));

        let err: AppError = RepositoryError::ConstraintViolation("amount_positive".into()).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: RepositoryError = SqlxError::RowNotFound.into();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
