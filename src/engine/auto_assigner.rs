// ==========================================
// 技师排班系统 - 自动分配引擎
// ==========================================
// 职责: 按轮转指针公平填充目标日期的空格子
// 顺序: 日期升序 -> 科室快照顺序 -> 格子序号升序
// 红线: 每次尝试 (无论是否接受) 指针都前进一格
// 红线: 只产生 NORMAL 分配; 疲劳周期视为硬约束
// 红线: 运行中不因约束失败而中断, 只有前置条件检查会拒绝
// ==========================================

use crate::domain::schedule::ScheduleId;
use crate::domain::types::{AutoFillMode, CoverageKind, YearMonth};
use crate::engine::availability::AvailabilityEngine;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::document::RosterState;
use serde::Serialize;
use tracing::{debug, info, instrument};

// ==========================================
// AutoDistributionReport - 运行报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoDistributionReport {
    pub schedule_id: ScheduleId,
    pub days_processed: Vec<u32>,
    /// 本次新填入的格子
    pub slots_filled: usize,
    /// 无合格候选而留空的格子
    pub slots_left_empty: usize,
    /// FILL_EMPTY 模式下保留的既有分配
    pub slots_kept: usize,
    /// 运行结束时的轮转指针 (已持久化)
    pub final_pointer: usize,
}

// ==========================================
// AutoAssigner - 自动分配引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoAssigner;

impl AutoAssigner {
    pub fn new() -> Self {
        Self
    }

    /// 自动分配
    ///
    /// # 参数
    /// - target_days: 目标日期 (月外日期与重复日期被忽略)
    /// - mode: FILL_EMPTY 跳过已占用格子; CLEAR_AND_FILL 先清空目标日
    ///
    /// # 错误
    /// - NothingToDo: 无有效目标日期或名册为空 (不修改状态)
    #[instrument(skip(self, state, target_days), fields(
        schedule_id = %schedule_id,
        ym = %ym,
        mode = %mode,
        target_days = target_days.len(),
    ))]
    pub fn run(
        &self,
        state: &mut RosterState,
        schedule_id: ScheduleId,
        ym: YearMonth,
        target_days: &[u32],
        mode: AutoFillMode,
    ) -> EngineResult<AutoDistributionReport> {
        let mut days: Vec<u32> = target_days
            .iter()
            .copied()
            .filter(|d| ym.contains_day(*d))
            .collect();
        days.sort_unstable();
        days.dedup();

        if days.is_empty() {
            return Err(EngineError::NothingToDo {
                reason: "no target days".to_string(),
            });
        }
        if state.technicians.is_empty() {
            return Err(EngineError::NothingToDo {
                reason: "empty roster".to_string(),
            });
        }

        let template = state.template_sectors(schedule_id).to_vec();
        let (record, _) = state.months.ensure(schedule_id, ym, &template);
        let sectors = record.sector_snapshot().to_vec();
        let mut pointer = record.rotation_pointer();

        let mut report = AutoDistributionReport {
            schedule_id,
            days_processed: days.clone(),
            slots_filled: 0,
            slots_left_empty: 0,
            slots_kept: 0,
            final_pointer: pointer,
        };

        for &day in &days {
            if mode == AutoFillMode::ClearAndFill {
                if let Some(record) = state.months.get_mut(schedule_id, ym) {
                    record.clear_day(day);
                }
            }

            // 当日候选列表 (不可用登记按日期变化, 不能跨日复用)
            let eligible: Vec<String> = AvailabilityEngine::new(state)
                .list_eligible(schedule_id, ym, day)
                .iter()
                .map(|t| t.id.clone())
                .collect();
            let n = eligible.len();

            for sector in &sectors {
                for index in 0..sector.capacity() {
                    let occupied = state
                        .months
                        .get(schedule_id, ym)
                        .map(|r| !r.slots(day, sector)[index].is_empty())
                        .unwrap_or(false);
                    if occupied {
                        report.slots_kept += 1;
                        continue;
                    }
                    if n == 0 {
                        report.slots_left_empty += 1;
                        continue;
                    }

                    let mut accepted: Option<String> = None;
                    {
                        let engine = AvailabilityEngine::new(state);
                        for _ in 0..n {
                            let candidate_id = &eligible[pointer % n];
                            pointer = (pointer + 1) % n;

                            let Some(candidate) = state.technician(candidate_id) else {
                                continue;
                            };
                            if engine.can_assign(
                                candidate_id,
                                schedule_id,
                                ym,
                                day,
                                CoverageKind::Normal,
                            ) && !engine.violates_fatigue_cycle(candidate, ym, day)
                            {
                                accepted = Some(candidate_id.clone());
                                break;
                            }
                        }
                    }

                    match accepted {
                        Some(technician_id) => {
                            if let Some(slots) = state.months.slots_mut(schedule_id, ym, day, sector) {
                                slots[index].occupy(&technician_id, CoverageKind::Normal);
                            }
                            debug!(day, sector = %sector.name, index, technician_id = %technician_id, "自动分配");
                            report.slots_filled += 1;
                        }
                        None => {
                            report.slots_left_empty += 1;
                        }
                    }
                }
            }
        }

        if let Some(record) = state.months.get_mut(schedule_id, ym) {
            record.set_rotation_pointer(pointer);
        }
        report.final_pointer = pointer;

        info!(
            filled = report.slots_filled,
            left_empty = report.slots_left_empty,
            kept = report.slots_kept,
            final_pointer = pointer,
            "自动分配完成"
        );
        Ok(report)
    }
}
