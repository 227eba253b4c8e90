pub mod audit;
pub mod auth_service;
pub mod directory_service;
pub mod group_service;
pub mod ledger_service;
pub mod notification;
pub mod report_service;

pub use audit::AuditTrailService;
pub use auth_service::{AuthService, LoginResult};
pub use directory_service::DirectoryService;
pub use group_service::GroupService;
pub use ledger_service::{LedgerRepositories, LedgerService, RecordFilter};
pub use notification::{NotificationOutcome, NotificationService};
pub use report_service::ReportService;
