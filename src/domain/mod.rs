// ==========================================
// 技师排班系统 - 领域模型层
// ==========================================
// 职责: 排班定义、科室、技师、不可用登记、月度记录
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod month;
pub mod roster;
pub mod schedule;
pub mod types;

// 重导出核心类型
pub use month::{DaySlots, MonthRecord, Slot};
pub use roster::{normalize_name, Occurrence, Technician};
pub use schedule::{
    clamp_required, ScheduleDefinition, ScheduleId, ScheduleTemplate, Sector, MAX_REQUIRED_COUNT,
    MIN_REQUIRED_COUNT, SCHEDULE_DEFS,
};
pub use types::{AutoFillMode, CoverageKind, Shift, Unit, WorkloadClass, YearMonth};
