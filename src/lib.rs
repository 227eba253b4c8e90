//! ChitConnect Backend Library
//!
//! This module exposes the backend components for use by tests and the server binary.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod format;
pub mod grpc_service;
pub mod models;
pub mod proto;
pub mod reports;
pub mod repositories;
pub mod services;
pub mod validation;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use services::*;
use std::sync::Arc;

/// Application state containing all repositories and services
pub struct AppState {
    pub database: Database,
    pub user_repo: Arc<UserRepository>,
    pub employee_repo: Arc<EmployeeRepository>,
    pub group_repo: Arc<GroupRepository>,
    pub collection_repo: Arc<CollectionRepository>,
    pub payment_repo: Arc<PaymentRepository>,
    pub salary_repo: Arc<SalaryRepository>,
    pub expense_repo: Arc<ExpenseRepository>,
    pub credit_repo: Arc<CreditRepository>,
    pub auction_repo: Arc<AuctionRepository>,
    pub session_repo: Arc<SessionRepository>,
    pub audit: Arc<AuditTrailService>,
    pub notification_service: Arc<NotificationService>,
    pub auth_service: AuthService,
    pub directory_service: DirectoryService,
    pub group_service: GroupService,
    pub ledger_service: LedgerService,
    pub report_service: ReportService,
}

impl AppState {
    /// Create a new AppState with initialized repositories and services
    pub fn new(pool: sqlx::PgPool, config: &AppConfig) -> AppResult<Self> {
        let database = Database::new(pool.clone());

        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let employee_repo = Arc::new(EmployeeRepository::new(pool.clone()));
        let group_repo = Arc::new(GroupRepository::new(pool.clone()));
        let collection_repo = Arc::new(CollectionRepository::new(pool.clone()));
        let payment_repo = Arc::new(PaymentRepository::new(pool.clone()));
        let salary_repo = Arc::new(SalaryRepository::new(pool.clone()));
        let expense_repo = Arc::new(ExpenseRepository::new(pool.clone()));
        let credit_repo = Arc::new(CreditRepository::new(pool.clone()));
        let auction_repo = Arc::new(AuctionRepository::new(pool.clone()));
        let session_repo = Arc::new(SessionRepository::new(pool));

        let audit = Arc::new(AuditTrailService::new(config.audit_log_dir.clone())?);
        let notification_service = Arc::new(NotificationService::new(config.messaging.clone()));

        let auth_service = AuthService::new(
            user_repo.clone(),
            employee_repo.clone(),
            session_repo.clone(),
            audit.clone(),
            config.session_ttl(),
        );
        let directory_service = DirectoryService::new(
            user_repo.clone(),
            employee_repo.clone(),
            session_repo.clone(),
            audit.clone(),
        );
        let group_service = GroupService::new(group_repo.clone(), user_repo.clone(), audit.clone());
        let ledger_service = LedgerService::new(
            LedgerRepositories {
                groups: group_repo.clone(),
                users: user_repo.clone(),
                employees: employee_repo.clone(),
                collections: collection_repo.clone(),
                payments: payment_repo.clone(),
                salaries: salary_repo.clone(),
                expenses: expense_repo.clone(),
                credits: credit_repo.clone(),
                auctions: auction_repo.clone(),
            },
            notification_service.clone(),
            audit.clone(),
        );
        let report_service = ReportService::new(
            group_repo.clone(),
            user_repo.clone(),
            employee_repo.clone(),
            collection_repo.clone(),
            payment_repo.clone(),
            salary_repo.clone(),
            expense_repo.clone(),
            credit_repo.clone(),
            auction_repo.clone(),
        );

        Ok(Self {
            database,
            user_repo,
            employee_repo,
            group_repo,
            collection_repo,
            payment_repo,
            salary_repo,
            expense_repo,
            credit_repo,
            auction_repo,
            session_repo,
            audit,
            notification_service,
            auth_service,
            directory_service,
            group_service,
            ledger_service,
            report_service,
        })
    }
}
