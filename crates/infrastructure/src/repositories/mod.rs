pub mod blocklist_repository;
pub mod query_log_repository;

pub use blocklist_repository::SqliteBlocklistRepository;
pub use query_log_repository::{DisabledQueryLogRepository, SqliteQueryLogRepository};
