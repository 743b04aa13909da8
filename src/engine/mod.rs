// ==========================================
// 技师排班系统 - 引擎层
// ==========================================
// 职责: 可用性判定 / 手工分配闸门 / 自动分配 / 只读投影
// 红线: Engine 不接触存储, 只读写 RosterState
// 红线: 任何失败都不修改状态 (由 StateRepository::transact 兜底回滚)
// ==========================================

pub mod auto_assigner;
pub mod availability;
pub mod error;
pub mod export;
pub mod manual_gate;
pub mod summary;

// 重导出核心引擎
pub use auto_assigner::{AutoAssigner, AutoDistributionReport};
pub use availability::AvailabilityEngine;
pub use error::{EngineError, EngineResult};
pub use export::{csv_file_name, ExportError, ExportMatrix, ExportResult};
pub use manual_gate::{AssignOutcome, ManualAssignRequest, ManualAssignmentGate, TechnicianRef};
pub use summary::{display_days, monthly_summary, schedule_summary, ScheduleSummary, SummaryRow};
