// ==========================================
// 技师排班系统 - 手工分配闸门
// ==========================================
// 职责: 单次人工分配的全部硬约束校验 + 格子清空
// 校验顺序: 未登记 -> 不可用 -> 无资格 -> 重复 -> 疲劳提示 -> 容量
// 红线: 疲劳周期是唯一可被确认越过的约束 (两阶段调用)
// 红线: 任何失败均不修改状态
// ==========================================

use crate::domain::roster::Technician;
use crate::domain::schedule::{ScheduleId, Sector};
use crate::domain::types::{CoverageKind, WorkloadClass, YearMonth};
use crate::engine::availability::AvailabilityEngine;
use crate::engine::error::{EngineError, EngineResult};
use crate::i18n;
use crate::repository::document::RosterState;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

// ==========================================
// 请求与结果
// ==========================================

/// 技师引用: 按 id 或按姓名 (规范化 + 大小写不敏感)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum TechnicianRef {
    Id(String),
    Name(String),
}

impl TechnicianRef {
    pub fn describe(&self) -> &str {
        match self {
            TechnicianRef::Id(id) => id,
            TechnicianRef::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAssignRequest {
    pub technician: TechnicianRef,
    pub schedule_id: ScheduleId,
    pub ym: YearMonth,
    pub day: u32,
    pub sector_id: String,
    #[serde(default)]
    pub coverage: CoverageKind,
    /// 第二阶段: 调用方已确认疲劳提示
    #[serde(default)]
    pub fatigue_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignOutcome {
    /// 已写入格子
    Assigned {
        technician_id: String,
        sector_id: String,
        day: u32,
        slot_index: usize,
        coverage: CoverageKind,
    },
    /// 违反疲劳周期, 需调用方确认后重新提交 (未修改状态)
    FatigueWarning {
        technician_id: String,
        technician_name: String,
        workload: WorkloadClass,
    },
}

impl AssignOutcome {
    /// 需要展示给调用方的提示文本 (仅 FatigueWarning 有)
    pub fn localized_message(&self) -> Option<String> {
        match self {
            AssignOutcome::Assigned { .. } => None,
            AssignOutcome::FatigueWarning {
                technician_name,
                workload,
                ..
            } => Some(i18n::fatigue_warning(technician_name, &workload.to_string())),
        }
    }
}

// ==========================================
// ManualAssignmentGate - 手工分配闸门
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualAssignmentGate;

impl ManualAssignmentGate {
    pub fn new() -> Self {
        Self
    }

    /// 手工分配
    ///
    /// # 返回
    /// - Assigned: 已放入该科室当日序号最小的空格子
    /// - FatigueWarning: 需要确认, 状态未变
    #[instrument(skip(self, state, request), fields(
        schedule_id = %request.schedule_id,
        ym = %request.ym,
        day = request.day,
        sector_id = %request.sector_id,
        coverage = %request.coverage,
    ))]
    pub fn assign(
        &self,
        state: &mut RosterState,
        request: &ManualAssignRequest,
    ) -> EngineResult<AssignOutcome> {
        let schedule_id = request.schedule_id;
        let ym = request.ym;
        let day = request.day;

        let date = ym
            .date(day)
            .ok_or(EngineError::InvalidDay { ym, day })?;
        let sector = resolve_sector(state, schedule_id, ym, &request.sector_id)?;

        let technician = resolve_technician(state, &request.technician)?.clone();

        {
            let engine = AvailabilityEngine::new(state);

            if engine.unavailable(&technician.id, date) {
                return Err(EngineError::Unavailable {
                    technician_id: technician.id,
                    date,
                });
            }

            if !engine.eligible(&technician, schedule_id) {
                return Err(EngineError::Ineligible {
                    technician_id: technician.id,
                    schedule_id,
                });
            }

            if !engine.can_assign(&technician.id, schedule_id, ym, day, request.coverage) {
                return Err(EngineError::Duplicate {
                    technician_id: technician.id,
                    coverage: request.coverage,
                    date,
                });
            }

            if engine.violates_fatigue_cycle(&technician, ym, day) && !request.fatigue_confirmed {
                warn!(technician_id = %technician.id, workload = %technician.workload, "疲劳周期提示，等待确认");
                return Ok(AssignOutcome::FatigueWarning {
                    technician_id: technician.id,
                    technician_name: technician.name,
                    workload: technician.workload,
                });
            }
        }

        let template = state.template_sectors(schedule_id).to_vec();
        let (record, _) = state.months.ensure(schedule_id, ym, &template);
        let slots = record.slots_mut(day, &sector);
        let slot_index = slots
            .iter()
            .position(|s| s.is_empty())
            .ok_or_else(|| EngineError::NoCapacity {
                sector_id: sector.id.clone(),
                day,
            })?;
        slots[slot_index].occupy(&technician.id, request.coverage);

        info!(
            technician_id = %technician.id,
            slot_index,
            fatigue_confirmed = request.fatigue_confirmed,
            "手工分配完成"
        );

        Ok(AssignOutcome::Assigned {
            technician_id: technician.id,
            sector_id: sector.id,
            day,
            slot_index,
            coverage: request.coverage,
        })
    }

    /// 清空单个格子 (无约束校验)
    #[instrument(skip(self, state))]
    pub fn clear_slot(
        &self,
        state: &mut RosterState,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        sector_id: &str,
        slot_index: usize,
    ) -> EngineResult<()> {
        if !ym.contains_day(day) {
            return Err(EngineError::InvalidDay { ym, day });
        }
        let sector = resolve_sector(state, schedule_id, ym, sector_id)?;
        if slot_index >= sector.capacity() {
            return Err(EngineError::InvalidSlot {
                capacity: sector.capacity(),
                sector_id: sector.id,
                index: slot_index,
            });
        }

        let template = state.template_sectors(schedule_id).to_vec();
        let (record, _) = state.months.ensure(schedule_id, ym, &template);
        record.slots_mut(day, &sector)[slot_index].clear();
        Ok(())
    }

    /// 清空某科室当日全部格子
    ///
    /// # 返回
    /// 被清空的已占用格子数
    #[instrument(skip(self, state))]
    pub fn clear_sector_day(
        &self,
        state: &mut RosterState,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        sector_id: &str,
    ) -> EngineResult<usize> {
        if !ym.contains_day(day) {
            return Err(EngineError::InvalidDay { ym, day });
        }
        let sector = resolve_sector(state, schedule_id, ym, sector_id)?;

        let template = state.template_sectors(schedule_id).to_vec();
        let (record, _) = state.months.ensure(schedule_id, ym, &template);
        let slots = record.slots_mut(day, &sector);
        let cleared = slots.iter().filter(|s| !s.is_empty()).count();
        slots.iter_mut().for_each(|s| s.clear());
        Ok(cleared)
    }
}

// ==========================================
// 内部工具
// ==========================================

/// 查找科室: 已物化月份用快照, 否则用当前模板 (首次写入时即冻结为快照)
pub(crate) fn resolve_sector(
    state: &RosterState,
    schedule_id: ScheduleId,
    ym: YearMonth,
    sector_id: &str,
) -> EngineResult<Sector> {
    let found = match state.months.get(schedule_id, ym) {
        Some(record) => record.find_sector(sector_id),
        None => state
            .template(schedule_id)
            .and_then(|t| t.find_sector(sector_id)),
    };
    found.cloned().ok_or_else(|| EngineError::UnknownSector {
        schedule_id,
        sector_id: sector_id.to_string(),
    })
}

pub(crate) fn resolve_technician<'a>(
    state: &'a RosterState,
    reference: &TechnicianRef,
) -> EngineResult<&'a Technician> {
    let found = match reference {
        TechnicianRef::Id(id) => state.technician(id),
        TechnicianRef::Name(name) => state.find_technician_by_name(name),
    };
    found.ok_or_else(|| EngineError::NotRegistered {
        reference: reference.describe().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::roster::Occurrence;

    fn ym() -> YearMonth {
        YearMonth::new(2026, 3).unwrap()
    }

    struct Fixture {
        state: RosterState,
        sector_id: String,
        ana: String,
    }

    fn fixture() -> Fixture {
        let mut state = RosterState::from_config(&EngineConfig::default());
        let tech = Technician::new("Ana", WorkloadClass::H40);
        let ana = tech.id.clone();
        state.technicians.push(tech);
        let sector_id = state.template_sectors(ScheduleId::UpaDia)[0].id.clone();
        Fixture {
            state,
            sector_id,
            ana,
        }
    }

    fn request(f: &Fixture, day: u32) -> ManualAssignRequest {
        ManualAssignRequest {
            technician: TechnicianRef::Id(f.ana.clone()),
            schedule_id: ScheduleId::UpaDia,
            ym: ym(),
            day,
            sector_id: f.sector_id.clone(),
            coverage: CoverageKind::Normal,
            fatigue_confirmed: false,
        }
    }

    #[test]
    fn test_assign_places_lowest_empty_slot() {
        let mut f = fixture();
        let gate = ManualAssignmentGate::new();
        let req = request(&f, 4);

        let outcome = gate.assign(&mut f.state, &req).unwrap();
        assert!(matches!(outcome, AssignOutcome::Assigned { slot_index: 0, .. }));
        assert!(f.state.months.is_materialized(ScheduleId::UpaDia, ym()));
    }

    #[test]
    fn test_assign_by_name() {
        let mut f = fixture();
        let mut req = request(&f, 4);
        req.technician = TechnicianRef::Name("  ana ".to_string());

        let outcome = ManualAssignmentGate::new().assign(&mut f.state, &req).unwrap();
        match outcome {
            AssignOutcome::Assigned { technician_id, .. } => assert_eq!(technician_id, f.ana),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_check_order() {
        let mut f = fixture();
        let gate = ManualAssignmentGate::new();

        let mut req = request(&f, 4);
        req.technician = TechnicianRef::Name("Ninguem".to_string());
        assert_eq!(gate.assign(&mut f.state, &req).unwrap_err().code(), "NOT_REGISTERED");

        // 不可用优先于无资格
        f.state.technicians[0].upa = false;
        f.state.occurrences.push(Occurrence::new(
            &f.ana,
            "LICENCA",
            ym().date(4).unwrap(),
            ym().date(4).unwrap(),
        ));
        let req = request(&f, 4);
        assert_eq!(gate.assign(&mut f.state, &req).unwrap_err().code(), "UNAVAILABLE");

        let req = request(&f, 5);
        assert_eq!(gate.assign(&mut f.state, &req).unwrap_err().code(), "INELIGIBLE");
        assert!(!f.state.months.is_materialized(ScheduleId::UpaDia, ym()));
    }

    #[test]
    fn test_duplicate_normal_and_extra() {
        let mut f = fixture();
        let gate = ManualAssignmentGate::new();
        let req = request(&f, 4);
        gate.assign(&mut f.state, &req).unwrap();

        let err = gate.assign(&mut f.state, &req).unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_NORMAL");

        let mut extra = request(&f, 4);
        extra.coverage = CoverageKind::Extra;
        assert_eq!(gate.assign(&mut f.state, &extra).unwrap_err().code(), "DUPLICATE_EXTRA");

        // 对班 EXTRA 允许
        let mut night = extra.clone();
        night.schedule_id = ScheduleId::UpaNoite;
        night.sector_id = f.state.template_sectors(ScheduleId::UpaNoite)[0].id.clone();
        assert!(matches!(
            gate.assign(&mut f.state, &night).unwrap(),
            AssignOutcome::Assigned { coverage: CoverageKind::Extra, .. }
        ));
    }

    #[test]
    fn test_fatigue_two_phase() {
        let mut f = fixture();
        let gate = ManualAssignmentGate::new();
        let req = request(&f, 4);
        gate.assign(&mut f.state, &req).unwrap();
        let before = f.state.clone();

        let req = request(&f, 5);
        let outcome = gate.assign(&mut f.state, &req).unwrap();
        assert!(matches!(outcome, AssignOutcome::FatigueWarning { .. }));
        assert_eq!(f.state, before);

        let mut confirmed = request(&f, 5);
        confirmed.fatigue_confirmed = true;
        assert!(matches!(
            gate.assign(&mut f.state, &confirmed).unwrap(),
            AssignOutcome::Assigned { day: 5, .. }
        ));
    }

    #[test]
    fn test_no_capacity_and_clear() {
        let mut f = fixture();
        let gate = ManualAssignmentGate::new();
        let sector_id = f.state.template_sectors(ScheduleId::UpaDia)[0].id.clone();
        f.state.template_mut(ScheduleId::UpaDia).unwrap().sectors[0].required_count = 1;

        let bruno = Technician::new("Bruno", WorkloadClass::H40);
        let bruno_id = bruno.id.clone();
        f.state.technicians.push(bruno);

        let first = request(&f, 10);
        gate.assign(&mut f.state, &first).unwrap();
        let mut req = request(&f, 10);
        req.technician = TechnicianRef::Id(bruno_id.clone());
        assert_eq!(gate.assign(&mut f.state, &req).unwrap_err().code(), "NO_CAPACITY");

        assert_eq!(
            gate.clear_slot(&mut f.state, ScheduleId::UpaDia, ym(), 10, &sector_id, 1)
                .unwrap_err()
                .code(),
            "INVALID_SLOT"
        );
        gate.clear_slot(&mut f.state, ScheduleId::UpaDia, ym(), 10, &sector_id, 0)
            .unwrap();
        assert!(gate.assign(&mut f.state, &req).is_ok());

        let cleared = gate
            .clear_sector_day(&mut f.state, ScheduleId::UpaDia, ym(), 10, &sector_id)
            .unwrap();
        assert_eq!(cleared, 1);
    }

    #[test]
    fn test_input_errors() {
        let mut f = fixture();
        let gate = ManualAssignmentGate::new();

        let mut req = request(&f, 32);
        assert_eq!(gate.assign(&mut f.state, &req).unwrap_err().code(), "INVALID_DAY");

        req.day = 3;
        req.sector_id = "nope".to_string();
        assert_eq!(gate.assign(&mut f.state, &req).unwrap_err().code(), "UNKNOWN_SECTOR");
    }
}
