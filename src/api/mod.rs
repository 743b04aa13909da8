// ==========================================
// 技师排班系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供宿主 (CLI / 界面) 调用
// 说明: 三个 API 共享同一个 SharedStateRepository
// ==========================================

pub mod error;
pub mod roster_api;
pub mod schedule_api;
pub mod sector_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use roster_api::{RosterApi, TechnicianUpdate};
pub use schedule_api::{CsvExport, DayView, ScheduleApi, SectorSlots};
pub use sector_api::{SectorApi, NEW_SECTOR_PREFIX};
