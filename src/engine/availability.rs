// ==========================================
// 技师排班系统 - 可用性引擎
// ==========================================
// 职责: 资格判定 / 不可用判定 / 跨排班重复判定 / 疲劳周期判定
// 输入: RosterState (名册 + 不可用登记 + 四套排班月度记录)
// 输出: 纯判定结果, 不修改状态
// 红线: 跨排班分配每次查询重新计算, 不缓存
// ==========================================

use crate::domain::roster::Technician;
use crate::domain::schedule::ScheduleId;
use crate::domain::types::{CoverageKind, YearMonth};
use crate::repository::document::RosterState;
use crate::repository::month_repo::ExistingAssignment;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// AvailabilityEngine - 可用性引擎
// ==========================================
pub struct AvailabilityEngine<'a> {
    state: &'a RosterState,
}

impl<'a> AvailabilityEngine<'a> {
    pub fn new(state: &'a RosterState) -> Self {
        Self { state }
    }

    /// 单位资格 + 班次资格同时匹配
    pub fn eligible(&self, technician: &Technician, schedule_id: ScheduleId) -> bool {
        technician.serves_unit(schedule_id.unit()) && technician.serves_shift(schedule_id.shift())
    }

    /// 当日是否被不可用登记覆盖 (首尾日期均包含)
    pub fn unavailable(&self, technician_id: &str, date: NaiveDate) -> bool {
        self.state
            .occurrences_of(technician_id)
            .any(|occ| occ.covers(date))
    }

    /// 当日可参与轮转的技师 (名册插入顺序)
    ///
    /// 日期不在月份内时返回空列表
    pub fn list_eligible(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
    ) -> Vec<&'a Technician> {
        let Some(date) = ym.date(day) else {
            return Vec::new();
        };
        let state = self.state;
        state
            .technicians
            .iter()
            .filter(|t| self.eligible(t, schedule_id) && !self.unavailable(&t.id, date))
            .collect()
    }

    /// 四套排班当日的全部既有分配
    pub fn cross_schedule_assignments(
        &self,
        ym: YearMonth,
        day: u32,
    ) -> HashMap<String, Vec<ExistingAssignment>> {
        self.state.months.assignments_on(ym, day)
    }

    /// 重复排班判定
    ///
    /// - 当日无任何分配: 允许
    /// - NORMAL: 当日存在任意分配即拒绝
    /// - EXTRA: 仅当存在同班次分配时拒绝
    #[instrument(skip(self), level = "trace")]
    pub fn can_assign(
        &self,
        technician_id: &str,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        coverage: CoverageKind,
    ) -> bool {
        let assignments = self.cross_schedule_assignments(ym, day);
        let Some(existing) = assignments.get(technician_id) else {
            return true;
        };
        if existing.is_empty() {
            return true;
        }
        match coverage {
            CoverageKind::Normal => false,
            CoverageKind::Extra => !existing
                .iter()
                .any(|a| a.shift == schedule_id.shift()),
        }
    }

    /// 疲劳周期判定
    ///
    /// 40h: 前 1 天上班即违反; 30h: 前 2 天内任一天上班即违反
    /// 月初之前的日期视为未上班
    #[instrument(skip(self, technician), fields(technician_id = %technician.id), level = "trace")]
    pub fn violates_fatigue_cycle(&self, technician: &Technician, ym: YearMonth, day: u32) -> bool {
        let rest = technician.workload.rest_days() as i64;
        (1..=rest).any(|back| {
            self.state
                .months
                .worked_on(&technician.id, ym, day as i64 - back)
        })
    }

    /// 手工分配候选: 资格 + 可用 + 不重复, 按姓名排序
    ///
    /// 疲劳周期不参与过滤 (手工模式下仅提示)
    pub fn manual_candidates(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        coverage: CoverageKind,
    ) -> Vec<&'a Technician> {
        let mut candidates: Vec<&'a Technician> = self
            .list_eligible(schedule_id, ym, day)
            .into_iter()
            .filter(|t| self.can_assign(&t.id, schedule_id, ym, day, coverage))
            .collect();
        candidates.sort_by_key(|t| t.name.to_lowercase());
        candidates
    }
}
