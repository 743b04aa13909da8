// ==========================================
// 技师排班系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务规则
// ==========================================
// 职责: 持久化文档、月度记录仓储、存储适配器
// ==========================================

pub mod document;
pub mod error;
pub mod json_file_store;
pub mod month_repo;
pub mod sqlite_state_store;
pub mod state_repo;
pub mod state_store;

// 重导出核心仓储
pub use document::{RosterState, DOCUMENT_VERSION};
pub use error::{RepositoryError, RepositoryResult};
pub use json_file_store::JsonFileStateStore;
pub use month_repo::{ExistingAssignment, MonthRepository};
pub use sqlite_state_store::SqliteStateStore;
pub use state_repo::{lock_repository, SharedStateRepository, StateRepository};
pub use state_store::{InMemoryStateStore, StateStore};
