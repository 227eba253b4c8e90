pub mod auction_repository;
pub mod collection_repository;
pub mod counter_repository;
pub mod credit_repository;
pub mod employee_repository;
pub mod expense_repository;
pub mod group_repository;
pub mod payment_repository;
pub mod salary_repository;
pub mod session_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use auction_repository::AuctionRepository;
pub use collection_repository::CollectionRepository;
pub use counter_repository::{CounterRepository, RECEIPT_COUNTER};
pub use credit_repository::CreditRepository;
pub use employee_repository::EmployeeRepository;
pub use expense_repository::ExpenseRepository;
pub use group_repository::GroupRepository;
pub use payment_repository::PaymentRepository;
pub use salary_repository::SalaryRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
