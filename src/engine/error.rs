// ==========================================
// 技师排班系统 - 引擎层错误类型
// ==========================================
// 说明: 全部为可恢复的业务结果, 失败时状态不变
// 提示 (FatigueWarning) 不是错误, 见 manual_gate::AssignOutcome
// ==========================================

use crate::domain::schedule::ScheduleId;
use crate::domain::types::{CoverageKind, YearMonth};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 分配约束 =====
    #[error("技师未登记: {reference}")]
    NotRegistered { reference: String },

    #[error("技师当日存在不可用登记: technician_id={technician_id}, date={date}")]
    Unavailable {
        technician_id: String,
        date: chrono::NaiveDate,
    },

    #[error("技师不具备该排班资格: technician_id={technician_id}, schedule={schedule_id}")]
    Ineligible {
        technician_id: String,
        schedule_id: ScheduleId,
    },

    #[error("当日重复排班: technician_id={technician_id}, coverage={coverage}, date={date}")]
    Duplicate {
        technician_id: String,
        coverage: CoverageKind,
        date: chrono::NaiveDate,
    },

    #[error("科室当日无空位: sector_id={sector_id}, day={day}")]
    NoCapacity { sector_id: String, day: u32 },

    // ===== 自动分配前置条件 =====
    #[error("无可执行内容: {reason}")]
    NothingToDo { reason: String },

    // ===== 输入错误 =====
    #[error("科室不存在: schedule={schedule_id}, sector_id={sector_id}")]
    UnknownSector {
        schedule_id: ScheduleId,
        sector_id: String,
    },

    #[error("日期不在月份内: ym={ym}, day={day}")]
    InvalidDay { ym: YearMonth, day: u32 },

    #[error("格子序号越界: sector_id={sector_id}, index={index}, capacity={capacity}")]
    InvalidSlot {
        sector_id: String,
        index: usize,
        capacity: usize,
    },
}

impl EngineError {
    /// 稳定错误码 (宿主用于映射文案)
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotRegistered { .. } => "NOT_REGISTERED",
            EngineError::Unavailable { .. } => "UNAVAILABLE",
            EngineError::Ineligible { .. } => "INELIGIBLE",
            EngineError::Duplicate {
                coverage: CoverageKind::Normal,
                ..
            } => "DUPLICATE_NORMAL",
            EngineError::Duplicate {
                coverage: CoverageKind::Extra,
                ..
            } => "DUPLICATE_EXTRA",
            EngineError::NoCapacity { .. } => "NO_CAPACITY",
            EngineError::NothingToDo { .. } => "NOTHING_TO_DO",
            EngineError::UnknownSector { .. } => "UNKNOWN_SECTOR",
            EngineError::InvalidDay { .. } => "INVALID_DAY",
            EngineError::InvalidSlot { .. } => "INVALID_SLOT",
        }
    }

    /// 面向用户的本地化文案
    pub fn localized_message(&self) -> String {
        crate::i18n::engine_error_message(self)
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_code_depends_on_coverage() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let normal = EngineError::Duplicate {
            technician_id: "T1".to_string(),
            coverage: CoverageKind::Normal,
            date,
        };
        let extra = EngineError::Duplicate {
            technician_id: "T1".to_string(),
            coverage: CoverageKind::Extra,
            date,
        };
        assert_eq!(normal.code(), "DUPLICATE_NORMAL");
        assert_eq!(extra.code(), "DUPLICATE_EXTRA");
        assert!(normal.to_string().contains("NORMAL"));
    }
}
